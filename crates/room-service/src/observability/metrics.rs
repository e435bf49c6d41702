//! Metrics definitions for the room service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `rs_` prefix for the room service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 4 values (GET, POST, PATCH, plus the odd probe verb)
//! - `endpoint`: 6 known paths, everything else collapsed to `/other`
//! - `status`: 3 values (success, error, timeout)
//! - `outcome` / `error_type`: bounded by code

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the Prometheus recorder fails to install (e.g.,
/// already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP request buckets with sub-second granularity
        .set_buckets_for_metric(
            Matcher::Prefix("rs_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Backend room API buckets, wider to cover the 10s request timeout
        .set_buckets_for_metric(
            Matcher::Prefix("rs_backend_request".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set backend request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `rs_http_requests_total`, `rs_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    // Determine status category for simplified querying
    let status = categorize_status_code(status_code);

    histogram!("rs_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rs_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion.
///
/// Every route is a static path (meeting codes travel in query strings
/// and bodies), so anything unrecognized collapses to `/other`.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/ready" | "/metrics" | "/meeting" | "/token" => path.to_string(),
        _ => "/other".to_string(),
    }
}

// ============================================================================
// Meeting Lifecycle Metrics
// ============================================================================

/// Record a meeting creation attempt.
///
/// Metric: `rs_meetings_created_total`
/// Labels: `status`
///
/// Status values: "success", "error"
pub fn record_meeting_created(status: &str) {
    counter!("rs_meetings_created_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a meeting code validation.
///
/// Metric: `rs_code_validations_total`
/// Labels: `outcome`
///
/// Outcome values: "valid", "invalid", "bad_request", "not_configured",
/// "error"
pub fn record_code_validation(outcome: &str) {
    counter!("rs_code_validations_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a join token issuance attempt.
///
/// Metric: `rs_tokens_issued_total`
/// Labels: `status`
///
/// Status values: "success", "bad_request", "not_configured", "error"
pub fn record_token_issued(status: &str) {
    counter!("rs_tokens_issued_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a room metadata update attempt.
///
/// Metric: `rs_metadata_updates_total`
/// Labels: `status`
///
/// Status values: "success", "bad_request", "unauthorized", "forbidden",
/// "not_found", "not_configured", "unavailable", "error"
pub fn record_metadata_update(status: &str) {
    counter!("rs_metadata_updates_total",
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Backend Room API Metrics
// ============================================================================

/// Record a media backend room API request.
///
/// Metric: `rs_backend_request_duration_seconds`, `rs_backend_requests_total`
/// Labels: `endpoint`, `status`
///
/// Endpoints: "rooms_list", "rooms_metadata"
/// Status: "success" or a bounded error type
pub fn record_backend_request(endpoint: &str, status: &str, duration: Duration) {
    histogram!("rs_backend_request_duration_seconds",
        "endpoint" => endpoint.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("rs_backend_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
