//! Observability module for the room service.
//!
//! Provides metrics definitions and instrumentation helpers.

pub mod metrics;

pub use metrics::{
    init_metrics_recorder, record_backend_request, record_code_validation, record_http_request,
    record_meeting_created, record_metadata_update, record_token_issued,
};
