//! Payroll engine HTTP server.
//!
//! Environment:
//!
//! - `PAYROLL_CONFIG_DIR`: directory with one subdirectory per country (default `./config`)
//! - `PAYROLL_BIND_ADDR`: listen address (default `127.0.0.1:3000`)
//! - `RUST_LOG`: log filter (default `info`)

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir =
        std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        std::env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir).inspect_err(|err| {
        tracing::error!(config_dir = %config_dir, error = %err, "Failed to load configuration");
    })?;
    let countries: Vec<String> = config.countries().map(|c| c.code.clone()).collect();
    tracing::info!(config_dir = %config_dir, countries = ?countries, "Loaded country configurations");

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("payroll-engine listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
