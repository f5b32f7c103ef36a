use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

mod error;
mod handlers;
mod models;
mod services;
mod utils;

use handlers::create_app;
use models::config::AppConfig;
use services::api::HttpComplaintApi;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::fallback(), Some(e)),
    };

    // Initialize logging
    let _log_guard = init_logging(&config.logging)?;

    info!("Starting Complaint Portal v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("Configuration error, using defaults: {}", e);
    }
    info!(api = %config.api.base_url, "Configuration loaded");

    let api = Arc::new(HttpComplaintApi::new(&config.api)?);
    let addr = config.server.socket_addr()?;

    // Create and run the web server
    let app = create_app(api, config);

    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
