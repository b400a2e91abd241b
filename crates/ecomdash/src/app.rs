//! Application lifecycle: load once, run the dashboard for a selection.

use crate::error::AppResult;
use crate::render::{render_json, render_text};
use ecomdash_analytics::{CityCustomers, DashboardReport, DashboardSession, Dataset, LoadReport};
use ecomdash_common::DashboardError;
use ecomdash_config::{Config, OutputFormat};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Everything the presenter shows for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Row accounting per loaded table
    pub load_reports: Vec<LoadReport>,
    /// Date-dependent panels
    pub report: DashboardReport,
    /// Present only when customer and geolocation tables were loaded
    pub customer_distribution: Option<Vec<CityCustomers>>,
}

/// Main application structure.
pub struct DashboardApp {
    config: Arc<Config>,
}

impl DashboardApp {
    /// Creates a new application instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the configured tables and start a session over them.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> AppResult<DashboardSession> {
        let data_config = self.config.data.clone();
        let dataset = tokio::task::spawn_blocking(move || Dataset::load(&data_config))
            .await
            .map_err(|e| DashboardError::with_source("Loader task failed", e))??;

        for report in dataset.load_reports() {
            if report.skipped_rows > 0 {
                warn!(
                    table = %report.table,
                    skipped = report.skipped_rows,
                    "Rows skipped while loading"
                );
            }
        }

        Ok(DashboardSession::new(dataset, &self.config))
    }

    /// Load the data and compute the dashboard for the configured range.
    pub async fn run(&self) -> AppResult<DashboardView> {
        let session = self.start_session().await?;
        let params = session.default_params();
        info!(range = %params.range, "Computing dashboard");

        let report = match session.update(params).await? {
            Some(report) => report,
            None => session.compute(&params),
        };

        Ok(DashboardView {
            load_reports: session.dataset().load_reports().to_vec(),
            report: DashboardReport::clone(&report),
            customer_distribution: session
                .customer_distribution()
                .map(|cities| Vec::clone(&cities)),
        })
    }

    /// Render a view in the configured output format.
    pub fn render(&self, view: &DashboardView) -> AppResult<String> {
        match self.config.output {
            OutputFormat::Json => render_json(view),
            OutputFormat::Text => render_text(view),
        }
    }
}
