//! Per-request access log.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error, info, warn};

/// Emits one access-log event per request. Server errors log at `error`,
/// client errors at `warn`, health probes at `debug`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => error!(%method, %path, status, latency_ms, "request failed"),
        400..=499 => warn!(%method, %path, status, latency_ms, "request rejected"),
        _ if path.ends_with("/health") => debug!(%method, %path, status, latency_ms, "health probe"),
        _ => info!(%method, %path, status, latency_ms, "request completed"),
    }

    response
}
