//! Error types and utilities for the dashboard pipeline.
//!
//! A zero-row outcome is never an error: every report is defined on an empty
//! input, so there is no `EmptyResult` variant here.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Main error type for dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An input file is missing or unreadable
    #[error("Data unavailable: {}", path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A required column is absent or has the wrong shape
    #[error("Schema mismatch in {file}: column '{column}' {message}")]
    SchemaMismatch {
        file: String,
        column: String,
        message: String,
    },

    /// Timestamp or numeric text that does not convert
    #[error("Parse failure in {file} line {line}, column '{column}': cannot parse {value:?}")]
    ParseFailure {
        file: String,
        line: u64,
        column: String,
        value: String,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for parameters or configuration values
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Malformed CSV structure (unbalanced quotes, bad UTF-8, ...)
    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DashboardError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a data-unavailable error for a path
    pub fn data_unavailable(path: impl AsRef<Path>) -> Self {
        Self::DataUnavailable {
            path: path.as_ref().to_path_buf(),
            source: None,
        }
    }

    /// Create a data-unavailable error for a path with the underlying cause
    pub fn data_unavailable_with_source(
        path: impl AsRef<Path>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataUnavailable {
            path: path.as_ref().to_path_buf(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a schema mismatch for a missing column
    pub fn missing_column(file: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            file: file.into(),
            column: column.into(),
            message: "is missing".to_string(),
        }
    }

    /// Create a schema mismatch with a custom description
    pub fn schema_mismatch(
        file: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            file: file.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a parse failure for a single cell
    pub fn parse_failure(
        file: impl Into<String>,
        line: u64,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ParseFailure {
            file: file.into(),
            line,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error is fatal to loading a data set
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. } | Self::SchemaMismatch { .. } | Self::Csv { .. }
        )
    }
}

/// Convert from csv::Error to DashboardError
impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        let message = match err.position() {
            Some(pos) => format!("malformed record at line {}", pos.line()),
            None => "malformed input".to_string(),
        };
        Self::Csv {
            message,
            source: Some(Box::new(err)),
        }
    }
}
