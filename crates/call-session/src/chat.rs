//! Chat messages over the reliable data channel.
//!
//! Wire format is a typed JSON envelope so future payload kinds can
//! share the channel:
//!
//! ```json
//! {"type": "chat", "message": "hello"}
//! ```
//!
//! Payloads with an unknown `type`, or that fail to parse at all, are
//! ignored. Ordering is whatever the channel delivers per sender;
//! there is no cross-sender ordering and receivers stamp arrival time
//! locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed wrapper for data channel payloads. Deserialization fails for
/// unknown types, which is how non-chat payloads get ignored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum DataEnvelope {
    Chat { message: String },
}

/// Encode a chat message into its wire envelope.
pub fn encode_chat(message: &str) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&DataEnvelope::Chat {
        message: message.to_string(),
    })
}

/// Decode a data channel payload, returning the chat text if and only
/// if it is a well-formed chat envelope.
#[must_use]
pub fn decode_chat(payload: &[u8]) -> Option<String> {
    match serde_json::from_slice(payload) {
        Ok(DataEnvelope::Chat { message }) => Some(message),
        Err(_) => None,
    }
}

/// A single chat entry as rendered in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Locally generated id, for list rendering.
    pub id: Uuid,
    /// Display name of the sender at the time of receipt.
    pub sender: String,
    /// Stable identity of the sender.
    pub sender_identity: String,
    /// The message text.
    pub message: String,
    /// Receiver-local arrival (or send) time.
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of chat messages for one session.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Append a message the local participant sent. Called before the
    /// broadcast goes out so the sender sees their own message even if
    /// delivery fails.
    pub fn append_local(&mut self, identity: &str, name: &str, text: &str) -> ChatMessage {
        self.append(identity, name, text)
    }

    /// Append a message received from a remote participant.
    pub fn append_remote(&mut self, sender_identity: &str, sender_name: &str, text: &str) {
        self.append(sender_identity, sender_name, text);
    }

    fn append(&mut self, identity: &str, name: &str, text: &str) -> ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender: name.to_string(),
            sender_identity: identity.to_string(),
            message: text.to_string(),
            timestamp: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }

    /// All messages in arrival order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
