use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use rx_client::ClinicApiClient;
use rx_core::CoreConfig;

/// Main entry point for the RX application
///
/// Resolves configuration once, builds the clinic API client and serves the REST facade.
///
/// # Environment Variables
/// - `RX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `RX_API_URL`: Clinic API base URL (default: "https://api.medipanels.com/api")
/// - `RX_API_TIMEOUT_SECS`: Clinic API request timeout in seconds (default: 30)
/// - `RX_COMPLAINTS`: Comma-separated complaint vocabulary
/// - `RX_BRANDING`: Preview footer branding, `none` to disable (default: "cureLink")
/// - `RX_API_TOKEN`: Bearer token for the clinic API
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rx_run=info".parse()?)
                .add_directive("rx_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("RX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("RX_API_URL").ok(),
        std::env::var("RX_API_TIMEOUT_SECS").ok(),
        std::env::var("RX_COMPLAINTS").ok(),
        std::env::var("RX_BRANDING").ok(),
    )?);
    let client = ClinicApiClient::new(&cfg, std::env::var("RX_API_TOKEN").ok())?;

    tracing::info!("++ Clinic API at {}", client.base_url());

    api_rest::serve(&rest_addr, AppState::new(cfg, client)).await
}
