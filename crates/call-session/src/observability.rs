//! Metrics definitions for the session core.
//!
//! All metrics follow Prometheus naming conventions with a `session_`
//! prefix and a `_total` suffix for counters. This crate records
//! through the `metrics` facade only; installing a recorder and
//! exporting are the embedding application's concern. Without a
//! recorder every call here is a no-op.
//!
//! # Cardinality
//!
//! Labels are bounded: `direction` has 2 values, `status` at most 4.

use metrics::counter;

/// Chat messages appended to the session log.
pub const CHAT_MESSAGES_TOTAL: &str = "session_chat_messages_total";

/// Encoder bitrate ceiling pushes attempted by the bitrate controller.
pub const BITRATE_PUSHES_TOTAL: &str = "session_bitrate_pushes_total";

/// Room metadata write attempts resolved (one per retry run, not per
/// attempt).
pub const METADATA_WRITES_TOTAL: &str = "session_metadata_writes_total";

/// Record a chat message entering the log.
///
/// Labels: `direction` = `sent` | `received`.
pub(crate) fn record_chat_message(direction: &'static str) {
    counter!(CHAT_MESSAGES_TOTAL, "direction" => direction).increment(1);
}

/// Record an encoder bitrate push.
///
/// Labels: `status` = `success` | `error`.
pub(crate) fn record_bitrate_push(status: &'static str) {
    counter!(BITRATE_PUSHES_TOTAL, "status" => status).increment(1);
}

/// Record the outcome of a metadata write run.
///
/// Labels: `status` = `success` | `rejected` | `exhausted`.
pub(crate) fn record_metadata_write(status: &'static str) {
    counter!(METADATA_WRITES_TOTAL, "status" => status).increment(1);
}
