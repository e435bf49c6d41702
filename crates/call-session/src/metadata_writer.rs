//! Host-side room metadata publication.
//!
//! After the host's session connects, the meeting name and host
//! identity are written server-side so late joiners see them. The
//! write races room creation on the media server, so it waits a short
//! settle delay and retries a few times, tolerating "room not found
//! yet". Exhaustion is logged and counted, never escalated: the call
//! works without the metadata.
//!
//! The write happens at most once per session. The only thing that
//! publishes again is an explicit meeting-name edit by the host.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::observability;

/// Errors reported by the meeting API.
#[derive(Debug, Error)]
pub enum MeetingApiError {
    /// The room does not exist server-side (yet). Retryable.
    #[error("room not found")]
    RoomNotFound,

    /// The API could not be reached. Retryable.
    #[error("meeting api unavailable: {0}")]
    Unavailable(String),

    /// The API refused the update. Permanent for this write.
    #[error("meeting api rejected the update: {0}")]
    Rejected(String),
}

/// Injected client for the meeting metadata endpoint.
#[async_trait]
pub trait MeetingApi: Send + Sync {
    /// Persist the meeting name and host identity for a room.
    async fn update_meeting(
        &self,
        room_name: &str,
        meeting_name: &str,
        host_identity: &str,
    ) -> Result<(), MeetingApiError>;
}

/// Timing for the metadata write.
///
/// Kept as a standalone value so the fixed spacing can be swapped for
/// a backoff curve without touching the writer.
#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    /// Delay before the first attempt, giving room creation time to
    /// land server-side.
    pub settle: Duration,
    /// Total number of attempts.
    pub attempts: u32,
    /// Delay between attempts.
    pub spacing: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            attempts: 3,
            spacing: Duration::from_secs(1),
        }
    }
}

/// One metadata write's worth of facts.
#[derive(Debug, Clone)]
pub struct MetadataWrite {
    pub room_name: String,
    pub meeting_name: String,
    pub host_identity: String,
}

/// Performs the at-most-once metadata write for a session.
pub struct MetadataWriter {
    api: Arc<dyn MeetingApi>,
    schedule: RetrySchedule,
    published: bool,
}

impl MetadataWriter {
    #[must_use]
    pub fn new(api: Arc<dyn MeetingApi>, schedule: RetrySchedule) -> Self {
        Self {
            api,
            schedule,
            published: false,
        }
    }

    /// Publish unless this session already has. The flag is set when
    /// the write is initiated, not when it succeeds, so reconnect
    /// events cannot double-publish while attempts are in flight.
    pub fn publish_once(&mut self, write: MetadataWrite) {
        if self.published {
            debug!(
                target: "session.metadata",
                room = %write.room_name,
                "Metadata already published this session, skipping"
            );
            return;
        }
        self.published = true;
        self.spawn_write(write);
    }

    /// Publish regardless of the one-shot flag. Used when the host
    /// edits the meeting name mid-call.
    pub fn republish(&mut self, write: MetadataWrite) {
        self.published = true;
        self.spawn_write(write);
    }

    fn spawn_write(&self, write: MetadataWrite) {
        let api = Arc::clone(&self.api);
        let schedule = self.schedule;
        tokio::spawn(async move {
            run_write(api.as_ref(), schedule, &write).await;
        });
    }
}

impl std::fmt::Debug for MetadataWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataWriter")
            .field("schedule", &self.schedule)
            .field("published", &self.published)
            .finish()
    }
}

/// Drive one write through the schedule.
#[instrument(skip_all, name = "session.metadata.write", fields(room = %write.room_name))]
async fn run_write(api: &dyn MeetingApi, schedule: RetrySchedule, write: &MetadataWrite) {
    sleep(schedule.settle).await;

    for attempt in 1..=schedule.attempts {
        match api
            .update_meeting(&write.room_name, &write.meeting_name, &write.host_identity)
            .await
        {
            Ok(()) => {
                observability::record_metadata_write("success");
                info!(
                    target: "session.metadata",
                    attempt,
                    "Published meeting metadata"
                );
                return;
            }
            Err(MeetingApiError::Rejected(reason)) => {
                observability::record_metadata_write("rejected");
                warn!(
                    target: "session.metadata",
                    attempt,
                    %reason,
                    "Meeting metadata update rejected, not retrying"
                );
                return;
            }
            Err(e) => {
                debug!(
                    target: "session.metadata",
                    attempt,
                    error = %e,
                    "Meeting metadata attempt failed"
                );
                if attempt < schedule.attempts {
                    sleep(schedule.spacing).await;
                }
            }
        }
    }

    observability::record_metadata_write("exhausted");
    warn!(
        target: "session.metadata",
        attempts = schedule.attempts,
        "Giving up on meeting metadata write, call continues without it"
    );
}
