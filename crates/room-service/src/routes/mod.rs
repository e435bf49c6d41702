//! HTTP routes for the room service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::RoomApi;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Client for the media backend's room API. `None` when the
    /// credential trio is not configured; affected endpoints report
    /// "not configured" at request time.
    pub room_api: Option<Arc<dyn RoomApi>>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/meeting` - POST creates a code, GET validates one, PATCH updates
///   room metadata (PATCH verifies the bearer token in-handler)
/// - `/token` - POST mints a join token
/// - `/health` - Liveness probe (simple "OK")
/// - `/ready` - Readiness probe (reports media backend configuration)
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    // Public routes (authentication, where required, happens in-handler
    // because each endpoint owns its error envelope)
    let public_routes = Router::new()
        .route(
            "/meeting",
            post(handlers::create_meeting)
                .get(handlers::validate_meeting)
                .patch(handlers::update_meeting),
        )
        .route("/token", post(handlers::issue_token))
        // Health check endpoints (unversioned operational endpoints)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // HTTP metrics layer (outermost) - captures ALL responses including
        // framework-level errors like 415, 400, 404, 405
        .layer(middleware::from_fn(http_metrics_middleware))
}
