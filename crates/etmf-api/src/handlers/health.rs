//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// 200 when the table store and every storage provider answer, 503
/// otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Table store health check failed");
            false
        }
    };
    let storage = state.storage_manager.health_check_all().await;
    let healthy = database_healthy && storage.values().all(|ok| *ok);

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: ComponentHealth {
                backend: state.store.backend_name().to_string(),
                healthy: database_healthy,
            },
            storage,
        }),
    )
}
