mod api_http;
mod config;
mod panels;
mod routes;
mod routes_dashboard;
mod routes_drift;
mod routes_history;
mod routes_predict;
mod routes_status;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api_http::HttpMonitorApi;
use crate::config::ConsoleConfig;
use crate::state::ConsoleState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = ConsoleConfig::from_env()?;
    info!(api_url = %cfg.api_url, "console: starting");

    let api = HttpMonitorApi::new(&cfg.api_url, cfg.http_timeout)?;
    let state = Arc::new(ConsoleState::new(Arc::new(api), cfg.clone()));

    // Views that load once on open. Failures land in their own view state.
    tokio::spawn({
        let state = state.clone();
        async move {
            tokio::join!(
                panels::check_connection(&state),
                panels::reload_history(&state),
                panels::reload_drift(&state),
            );
        }
    });

    let dashboard = panels::activate_dashboard(state.clone());

    let app = routes::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "console listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    panels::deactivate_dashboard(&state, dashboard).await;
    info!("console: stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler failed: {e}");
        std::future::pending::<()>().await;
    }
}
