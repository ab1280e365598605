//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST facade on its own against the configured clinic API.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `rx-run` binary does the same with
//! the workspace-wide logging defaults.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use rx_client::ClinicApiClient;
use rx_core::CoreConfig;

/// Main entry point for the RX REST API server.
///
/// # Environment Variables
/// - `RX_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `RX_API_URL`, `RX_API_TIMEOUT_SECS`, `RX_COMPLAINTS`, `RX_BRANDING`: core configuration
/// - `RX_API_TOKEN`: bearer token sent to the clinic API
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("RX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("RX_API_URL").ok(),
        std::env::var("RX_API_TIMEOUT_SECS").ok(),
        std::env::var("RX_COMPLAINTS").ok(),
        std::env::var("RX_BRANDING").ok(),
    )?);
    let client = ClinicApiClient::new(&cfg, std::env::var("RX_API_TOKEN").ok())?;

    tracing::info!("-- Clinic API at {}", client.base_url());
    api_rest::serve(&addr, AppState::new(cfg, client)).await
}
