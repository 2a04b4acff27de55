//! Application builder: wires router + middleware + state into an Axum app,
//! and runs the server.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use etmf_core::config::AppConfig;
use etmf_core::error::AppError;
use etmf_database::TableStore;
use etmf_storage::StorageManager;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds.max(1));
    build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
            .layer(CompressionLayer::new()),
    )
}

/// Runs the portal server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting eTMF portal server...");

    // ── Step 1: Relational store ─────────────────────────────
    let store = TableStore::from_config(&config.database).await?;
    info!(backend = store.backend_name(), "Table store ready");

    // ── Step 2: Object storage ───────────────────────────────
    let storage_manager = StorageManager::from_config(&config.storage).await?;

    // ── Step 3: Services ─────────────────────────────────────
    let state = AppState::new(config.clone(), store, storage_manager);

    // ── Step 4: Expired-session cleanup ──────────────────────
    let cleanup = state.session_cleanup().spawn();

    // ── Step 5: HTTP server ──────────────────────────────────
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "eTMF portal listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")));

    cleanup.abort();
    info!("eTMF portal stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
