// =============================================================================
// Tickerscope - Main Entry Point
// =============================================================================
//
// Serves daily technical indicators and base-100 comparisons for equities.
// Every request fetches fresh history from the provider; nothing is cached.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod comparison;
mod config;
mod engine;
mod indicators;
mod market_data;
mod provider;
mod service;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{AppConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};
use crate::provider::AlphaVantageClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok());

    if config.api_key.is_empty() {
        warn!("No provider API key configured; every fetch will come back empty");
    }
    info!(
        base_url = %config.base_url,
        inter_request_delay_ms = config.inter_request_delay_ms,
        request_timeout_secs = config.request_timeout_secs,
        "Provider configured"
    );

    // ── 2. Provider & shared state ───────────────────────────────────────
    let provider = Arc::new(AlphaVantageClient::new(&config)?);
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, provider));

    // ── 3. HTTP server ───────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Tickerscope shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received - stopping gracefully");
}
