//! Health check handlers.
//!
//! Provides health check endpoints for Kubernetes liveness and readiness probes.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - reports the media backend configuration state

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Returns a simple "OK" response to indicate the process is running.
/// Does NOT check any dependencies - failure means the process is hung/deadlocked.
///
/// Kubernetes will kill and restart the pod if this fails.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Running without media backend credentials is a supported state (the
/// affected endpoints answer with their "not configured" envelopes), so
/// this always reports ready and exposes the configuration state for
/// operators instead of flipping to 503.
#[tracing::instrument(skip_all, name = "rs.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let media_backend = if state.config.media.is_some() {
        "configured"
    } else {
        tracing::debug!(target: "rs.handlers.health", "Media backend credentials not configured");
        "not_configured"
    };

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            media_backend: Some(media_backend),
        }),
    )
}
