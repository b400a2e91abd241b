//! Main entry point for the dashboard.

use anyhow::Context;
use ecomdash::DashboardApp;
use ecomdash_common::{init_default_logging, init_logging};
use ecomdash_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            let _ = init_default_logging();
            error!("Configuration failed: {}", e);
            return Err(e).context("Failed to load configuration");
        }
    };

    init_logging(config.logging.to_logging_config()).context("Failed to initialize logging")?;
    info!("Starting ecomdash");

    let app = DashboardApp::new(config);
    let view = match app.run().await {
        Ok(view) => view,
        Err(e) => {
            error!("Dashboard failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", app.render(&view)?);
    Ok(())
}
