//! `symbiotica-bridge` binary entrypoint.

use anyhow::{Context, Result};
use symbiotica_bridge::{serve, AppState};
use symbiotica_config::load_config;
use symbiotica_telemetry::{init_subscriber, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;

    init_subscriber(&TelemetryConfig {
        level: config.logging.level.clone(),
        json_output: config.logging.json,
    });
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.completion.model,
        "starting symbiotica-bridge"
    );

    let state = AppState::from_config(config)?;
    serve(state).await
}
