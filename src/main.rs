// =============================================================================
// Series Pipeline: HTTP service entry point
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use series_pipeline::api;
use series_pipeline::app_state::AppState;
use series_pipeline::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("SERIES_PIPELINE_CONFIG")
        .unwrap_or_else(|_| "pipeline_config.json".into());

    let mut config = RuntimeConfig::load_or_default(&config_path)?;

    if let Ok(addr) = std::env::var("SERIES_PIPELINE_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        bind_addr = %config.bind_addr,
        periods = ?config.study_periods,
        max_request_points = config.max_request_points,
        "Series pipeline starting"
    );

    // ── 2. Shared state & API server ─────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    // ── 3. Serve until Ctrl+C ────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received: stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Series pipeline shut down complete.");
    Ok(())
}
