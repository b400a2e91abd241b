//! Application-wide error types using thiserror.

use ecomdash_common::DashboardError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Loading, configuration or pipeline error.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// JSON rendering error.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text rendering error.
    #[error("Text output error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type for the dashboard application.
pub type AppResult<T> = Result<T, AppError>;
