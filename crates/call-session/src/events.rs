//! Backend event stream types.
//!
//! The shell subscribes to its platform SDK's room events and forwards
//! them to the session actor as [`SessionEvent`] values over an mpsc
//! channel. The actor is the single consumer; events carry raw
//! backend-reported facts and the roster does the decoding.

use crate::devices::DeviceKind;

/// Facts about a remote participant as reported by the backend.
#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    /// Stable identity assigned at token issuance.
    pub identity: String,
    /// Display name, if the backend knows one.
    pub name: Option<String>,
    /// Raw metadata blob carried in the participant's join token.
    pub metadata: Option<String>,
    /// Whether the participant's microphone is currently enabled.
    pub microphone_enabled: bool,
    /// Whether the participant's camera is currently enabled.
    pub camera_enabled: bool,
}

/// Event emitted by the connected backend session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The local participant finished connecting to the room.
    Connected,

    /// A remote participant joined.
    ParticipantConnected(ParticipantInfo),

    /// A remote participant left.
    ParticipantDisconnected {
        identity: String,
    },

    /// A data packet arrived on the data channel.
    DataReceived {
        sender_identity: String,
        sender_name: Option<String>,
        payload: Vec<u8>,
    },

    /// The set of actively speaking participants changed. Identities
    /// absent from the list are not speaking.
    ActiveSpeakersChanged {
        identities: Vec<String>,
    },

    /// A participant's microphone or camera enabled state changed.
    /// Fires for the local participant too.
    TrackMuteChanged {
        identity: String,
        kind: DeviceKind,
        enabled: bool,
    },

    /// A participant's metadata blob changed.
    MetadataChanged {
        identity: String,
        metadata: String,
    },

    /// The backend connection dropped; the session is over.
    Disconnected {
        reason: String,
    },
}
