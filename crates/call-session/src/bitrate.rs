//! Adaptive publish bitrate.
//!
//! Small calls get a generous ceiling; larger calls trade per-stream
//! quality for aggregate bandwidth. The controller memoizes the last
//! target it applied so the backend sees exactly one push per band
//! crossing, not one per roster event.

use tracing::{debug, warn};

use crate::backend::MediaBackend;
use crate::observability;

/// Participant count at or below which the high ceiling applies.
const SMALL_CALL_MAX_PARTICIPANTS: usize = 2;
/// Ceiling for one-on-one calls, in bits per second.
const SMALL_CALL_BITRATE: u64 = 4_000_000;
/// Ceiling once a third participant joins, in bits per second.
const LARGE_CALL_BITRATE: u64 = 2_500_000;

/// Target publish ceiling for a call of the given size, local
/// participant included.
#[must_use]
pub fn target_bitrate(participant_count: usize) -> u64 {
    if participant_count <= SMALL_CALL_MAX_PARTICIPANTS {
        SMALL_CALL_BITRATE
    } else {
        LARGE_CALL_BITRATE
    }
}

/// Pushes bitrate targets to the backend, once per change.
#[derive(Debug, Default)]
pub struct BitrateController {
    applied: Option<u64>,
}

impl BitrateController {
    /// Recompute the target for the given participant count and push
    /// it to the backend if it changed. Apply failures are logged and
    /// swallowed; video continues at the previously applied ceiling
    /// and the target is not retried until the count crosses a band
    /// boundary again.
    pub async fn update(&mut self, participant_count: usize, backend: &dyn MediaBackend) {
        let target = target_bitrate(participant_count);
        if self.applied == Some(target) {
            return;
        }
        self.applied = Some(target);

        match backend.set_video_max_bitrate(target).await {
            Ok(()) => {
                observability::record_bitrate_push("success");
                debug!(
                    target: "session.bitrate",
                    participant_count,
                    bits_per_second = target,
                    "Applied publish bitrate ceiling"
                );
            }
            Err(e) => {
                observability::record_bitrate_push("error");
                warn!(
                    target: "session.bitrate",
                    participant_count,
                    bits_per_second = target,
                    error = %e,
                    "Failed to apply publish bitrate ceiling, keeping previous"
                );
            }
        }
    }
}
