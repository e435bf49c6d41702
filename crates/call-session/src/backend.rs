//! Media backend seam for the in-call session.
//!
//! [`MediaBackend`] abstracts the connected room session the platform
//! SDK provides: data channel publishing, local capture control, and
//! the outgoing video encoder. The session actor is the only caller;
//! the shell supplies the implementation when it connects the call.
//!
//! Backend events (participant joins, data packets, mute changes) do
//! not flow through this trait. They arrive on a separate event stream
//! the shell feeds into the actor, see [`crate::events`].

use async_trait::async_trait;
use thiserror::Error;

use crate::devices::DeviceKind;

// ============================================================================
// Errors
// ============================================================================

/// Media backend operation error.
///
/// Every caller in this crate treats these as best-effort failures:
/// logged, sometimes counted, never escalated to the user.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend unreachable or the session connection dropped.
    #[error("media backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the operation (rejected negotiation, publish
    /// denied, unknown device).
    #[error("media backend rejected the operation: {0}")]
    Rejected(String),
}

// ============================================================================
// Trait
// ============================================================================

/// Connected media backend session.
///
/// Implementations wrap the platform SDK's room object. All methods
/// are callable from the session actor task; implementations must not
/// block.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Publish a payload to all participants on the reliable data
    /// channel.
    async fn publish_data(&self, payload: Vec<u8>) -> Result<(), BackendError>;

    /// Set the maximum outgoing video bitrate in bits per second,
    /// applied across all simulcast layers.
    async fn set_video_max_bitrate(&self, bits_per_second: u64) -> Result<(), BackendError>;

    /// Enable or disable the local microphone capture.
    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), BackendError>;

    /// Enable or disable the local camera capture.
    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), BackendError>;

    /// Switch the active capture device of the given kind.
    async fn switch_active_device(
        &self,
        kind: DeviceKind,
        device_id: &str,
    ) -> Result<(), BackendError>;

    /// Disconnect from the room, releasing devices and listeners.
    /// Idempotent.
    async fn disconnect(&self);
}
