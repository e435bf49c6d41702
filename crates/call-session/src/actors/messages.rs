//! Message types for the session actor.
//!
//! The shell talks to the actor via strongly-typed commands over
//! `tokio::sync::mpsc`. Commands that need an answer carry a
//! `tokio::sync::oneshot` reply channel.

use tokio::sync::oneshot;

use common::metadata::ParticipantMetadata;

use crate::chat::ChatMessage;
use crate::devices::DeviceKind;
use crate::prejoin::JoinIntent;
use crate::roster::Participant;

/// Commands sent to `SessionActor`.
#[derive(Debug)]
pub enum SessionCommand {
    /// Send a chat message to everyone in the call.
    SendChat {
        text: String,
        /// Response channel for the locally appended message.
        respond_to: oneshot::Sender<ChatMessage>,
    },

    /// Get a point-in-time copy of the visible call state.
    GetSnapshot {
        /// Response channel for the snapshot.
        respond_to: oneshot::Sender<SessionSnapshot>,
    },

    /// Enable or disable the local microphone.
    SetMicrophoneEnabled { enabled: bool },

    /// Enable or disable the local camera.
    SetCameraEnabled { enabled: bool },

    /// Switch the active capture device mid-call.
    SwitchDevice { kind: DeviceKind, device_id: String },

    /// Rename the meeting. Hosts republish room metadata; for anyone
    /// else this only updates local state.
    SetMeetingName { name: String },

    /// Leave the call and shut the session down.
    Leave {
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<()>,
    },
}

/// Point-in-time copy of what the shell renders.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Participants in display order, local first.
    pub participants: Vec<Participant>,
    /// Chat log in arrival order.
    pub chat: Vec<ChatMessage>,
    /// Whether the backend currently reports the session connected.
    pub connected: bool,
    /// Current meeting name, if one is known.
    pub meeting_name: Option<String>,
}

// ============================================================================
// Supporting types
// ============================================================================

/// Everything the actor needs to know about the local participant and
/// the room it is joining.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend room name (the join code).
    pub room_name: String,
    /// Human-readable meeting name, if the creator set one.
    pub meeting_name: Option<String>,
    /// Local participant identity from token issuance.
    pub identity: String,
    /// Local participant display name.
    pub display_name: String,
    /// Whether the local participant created the meeting.
    pub is_host: bool,
    /// Metadata published for the local participant.
    pub metadata: ParticipantMetadata,
    /// Device choices carried over from the pre-join screen.
    pub join_intent: JoinIntent,
}
