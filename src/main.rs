// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::ingestion_controller::{DashboardContext, IngestionController};
use crate::application::summary_deriver::SummaryDeriver;
use crate::infrastructure::batch_client::HttpBatchSource;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::dashboard_feed::WatchSurface;
use crate::infrastructure::live_socket::WebSocketLiveSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_legend, get_series, get_status, health_check, stream_status};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config().context("Failed to load dashboard configuration")?;
    let deriver = SummaryDeriver::new(config.display.zone()?);

    // Create sources (infrastructure layer)
    let historical = Arc::new(HttpBatchSource::new(config.source.batch_url.clone()));
    let live = Arc::new(WebSocketLiveSource::new(config.source.live_url.clone()));

    // Create the controller and the surface it publishes to (application layer)
    let (surface, feed) = WatchSurface::new();
    let mut controller = IngestionController::new(
        historical,
        live,
        DashboardContext::new(deriver, Box::new(surface)),
    );

    let state = Arc::new(AppState { feed, deriver });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/series", get(get_series))
        .route("/status", get(get_status))
        .route("/status/stream", get(stream_status))
        .route("/legend", get(get_legend))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("Starting netmon-dashboard on {}", config.server.bind_addr);

    // Ingestion runs as a single task; the live channel is not reopened once it closes.
    let ingestion = tokio::spawn(async move {
        controller.run().await;
        tracing::info!("Ingestion finished; serving the last known state");
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingestion.abort();
    tracing::info!("Exiting netmon-dashboard");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
