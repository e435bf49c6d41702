//! HTTP metrics middleware.
//!
//! Applied as the outermost layer so every response is counted,
//! including ones produced before any handler runs:
//! - 404 Not Found and 405 Method Not Allowed from the router
//! - 408 from the timeout layer
//! - 415 Unsupported Media Type (wrong Content-Type)
//!
//! Meeting codes travel in query strings and request bodies, never in
//! the path, so the recorded path is already bounded; unrecognized
//! paths still collapse to `/other` inside the recorder.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status code, and duration for every
/// request that passes through.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // uri().path() excludes the query string, so `?code=...` never
    // reaches a label
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}
