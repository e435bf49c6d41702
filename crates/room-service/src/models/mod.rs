//! Room service API models.
//!
//! Request and response types for the client-facing REST API. The wire
//! format is camelCase JSON; each endpoint owns its envelope shape, so
//! the constructors here are the only place those shapes are spelled out.

use common::metadata::RoomMetadata;
use serde::{Deserialize, Serialize};

/// Maximum meeting name length in characters (after trimming).
pub const MAX_MEETING_NAME_LENGTH: usize = 100;

/// Maximum participant name length in characters (after trimming).
pub const MAX_PARTICIPANT_NAME_LENGTH: usize = 100;

/// Response after creating a meeting.
///
/// Returned by `POST /meeting` with status 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingResponse {
    /// Always `true` on this path; failures use [`ActionOutcome`].
    pub success: bool,

    /// Canonical meeting code in `xxx-xxxx-xxx` form.
    pub meeting_code: String,
}

/// Mutation outcome envelope.
///
/// Used by `POST /meeting` failures and by every `PATCH /meeting`
/// response: `{ "success": true }` or `{ "success": false, "error": … }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the mutation took effect.
    pub success: bool,

    /// Generic client-facing message (real causes are logged server-side).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Successful mutation: `{ "success": true }`.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed mutation: `{ "success": false, "error": … }`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Response for meeting code validation.
///
/// Returned by `GET /meeting?code=…`. A room that exists validates with
/// whatever metadata survived decoding; a room that is absent or behind
/// an unreachable backend reports `{ "valid": false }` with no error
/// field, so the two cases are observably identical to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMeetingResponse {
    /// Whether the meeting code names a live room.
    pub valid: bool,

    /// Stored meeting name, when present and decodable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_name: Option<String>,

    /// Identity of the host that stored the metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_identity: Option<String>,

    /// Set only on request-level failures (missing code, config, internal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateMeetingResponse {
    /// Room not found (or backend unreachable): `{ "valid": false }`.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            valid: false,
            meeting_name: None,
            host_identity: None,
            error: None,
        }
    }

    /// Room exists; carry whatever metadata decoded.
    #[must_use]
    pub fn found(metadata: RoomMetadata) -> Self {
        Self {
            valid: true,
            meeting_name: metadata.meeting_name,
            host_identity: metadata.host_identity,
            error: None,
        }
    }

    /// Request-level failure with a generic message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            meeting_name: None,
            host_identity: None,
            error: Some(message.into()),
        }
    }
}

/// Request to update stored room metadata.
///
/// Sent by the meeting host via `PATCH /meeting`, authenticated with the
/// host's own join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMeetingRequest {
    /// Room the metadata belongs to. Must match the token's room grant.
    pub room_name: String,

    /// Meeting display name to store (1-100 characters after trimming).
    pub meeting_name: String,

    /// Identity of the publishing host.
    pub host_identity: String,
}

impl UpdateMeetingRequest {
    /// Validate the request fields.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.room_name.trim().is_empty() {
            return Err("Room name is required");
        }

        let meeting_name = self.meeting_name.trim();

        if meeting_name.is_empty() {
            return Err("Meeting name is required");
        }

        if meeting_name.chars().count() > MAX_MEETING_NAME_LENGTH {
            return Err("Meeting name must be at most 100 characters");
        }

        if self.host_identity.trim().is_empty() {
            return Err("Host identity is required");
        }

        Ok(())
    }
}

/// Request for a join token.
///
/// Sent by clients via `POST /token` before connecting to the media
/// backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenRequest {
    /// Meeting code to join; must be canonical `xxx-xxxx-xxx`.
    pub room_name: String,

    /// Display name of the joining participant (1-100 characters).
    pub participant_name: String,

    /// Whether the participant claims the host role.
    #[serde(default)]
    pub is_host: bool,

    /// Requested accent color id (e.g. "blue"); unknown values fall back
    /// to the default palette entry.
    #[serde(default)]
    pub accent_color: Option<String>,
}

impl TokenRequest {
    /// Validate the participant name.
    ///
    /// The room name is checked separately against the canonical code
    /// format by the handler.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        let participant_name = self.participant_name.trim();

        if participant_name.is_empty() {
            return Err("Participant name is required");
        }

        if participant_name.chars().count() > MAX_PARTICIPANT_NAME_LENGTH {
            return Err("Participant name must be at most 100 characters");
        }

        Ok(())
    }
}

/// Response carrying a freshly minted join token.
///
/// Returned by `POST /token` with status 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed HS256 join token.
    pub token: String,

    /// The media backend's client-facing ws(s) URL.
    pub ws_url: String,
}

/// Flat error envelope used by `POST /token` failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Generic client-facing message.
    pub error: String,
}

impl ErrorMessage {
    /// Build an error envelope from any printable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status. Always "ready": running without media
    /// credentials is a supported state, reported via `media_backend`.
    pub status: &'static str,

    /// Media backend configuration state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_backend: Option<&'static str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // ========================================================================
    // Envelope serialization
    // ========================================================================

    #[test]
    fn test_create_meeting_response_serialization() {
        let response = CreateMeetingResponse {
            success: true,
            meeting_code: "abc-defg-hij".to_string(),
        };

        let json = serde_json::to_string(&response).expect("serialization should succeed");
        assert_eq!(json, r#"{"success":true,"meetingCode":"abc-defg-hij"}"#);
    }

    #[test]
    fn test_action_outcome_ok_omits_error() {
        let json = serde_json::to_string(&ActionOutcome::ok())
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn test_action_outcome_failed() {
        let json = serde_json::to_string(&ActionOutcome::failed("Room not found"))
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"success":false,"error":"Room not found"}"#);
    }

    #[test]
    fn test_validate_response_not_found_is_bare() {
        let json = serde_json::to_string(&ValidateMeetingResponse::not_found())
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"valid":false}"#);
    }

    #[test]
    fn test_validate_response_found_carries_metadata() {
        let metadata = RoomMetadata {
            meeting_name: Some("Standup".to_string()),
            host_identity: Some("alice".to_string()),
        };

        let json = serde_json::to_string(&ValidateMeetingResponse::found(metadata))
            .expect("serialization should succeed");
        assert_eq!(
            json,
            r#"{"valid":true,"meetingName":"Standup","hostIdentity":"alice"}"#
        );
    }

    #[test]
    fn test_validate_response_found_with_empty_metadata() {
        let json = serde_json::to_string(&ValidateMeetingResponse::found(RoomMetadata::default()))
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"valid":true}"#);
    }

    #[test]
    fn test_validate_response_failed() {
        let json = serde_json::to_string(&ValidateMeetingResponse::failed(
            "Meeting code is required",
        ))
        .expect("serialization should succeed");
        assert_eq!(
            json,
            r#"{"valid":false,"error":"Meeting code is required"}"#
        );
    }

    #[test]
    fn test_error_message_serialization() {
        let json = serde_json::to_string(&ErrorMessage::new("Invalid meeting code"))
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"error":"Invalid meeting code"}"#);
    }

    #[test]
    fn test_token_response_uses_camel_case() {
        let response = TokenResponse {
            token: "eyJhbGciOiJIUzI1NiJ9.x.y".to_string(),
            ws_url: "wss://media.example.com".to_string(),
        };

        let json = serde_json::to_string(&response).expect("serialization should succeed");
        assert!(json.contains("\"wsUrl\":\"wss://media.example.com\""));
        assert!(json.contains("\"token\":\"eyJ"));
    }

    #[test]
    fn test_readiness_response_serialization() {
        let response = ReadinessResponse {
            status: "ready",
            media_backend: Some("configured"),
        };

        let json = serde_json::to_string(&response).expect("serialization should succeed");
        assert!(json.contains("\"status\":\"ready\""));
        assert!(json.contains("\"media_backend\":\"configured\""));
    }

    // ========================================================================
    // UpdateMeetingRequest
    // ========================================================================

    #[test]
    fn test_update_meeting_request_deserialization() {
        let json = r#"{"roomName":"abc-defg-hij","meetingName":"Standup","hostIdentity":"alice"}"#;
        let request: UpdateMeetingRequest =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(request.room_name, "abc-defg-hij");
        assert_eq!(request.meeting_name, "Standup");
        assert_eq!(request.host_identity, "alice");
    }

    #[test]
    fn test_update_meeting_request_rejects_unknown_fields() {
        let json = r#"{"roomName":"a","meetingName":"b","hostIdentity":"c","extra":"d"}"#;
        let result: Result<UpdateMeetingRequest, _> = serde_json::from_str(json);

        assert!(result.is_err(), "Should reject unknown fields");
    }

    #[test]
    fn test_update_meeting_request_validation_success() {
        let request = UpdateMeetingRequest {
            room_name: "abc-defg-hij".to_string(),
            meeting_name: "Weekly Sync".to_string(),
            host_identity: "alice".to_string(),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_meeting_request_validation_empty_room() {
        let request = UpdateMeetingRequest {
            room_name: "   ".to_string(),
            meeting_name: "Weekly Sync".to_string(),
            host_identity: "alice".to_string(),
        };

        assert_eq!(request.validate().unwrap_err(), "Room name is required");
    }

    #[test]
    fn test_update_meeting_request_validation_empty_name() {
        let request = UpdateMeetingRequest {
            room_name: "abc-defg-hij".to_string(),
            meeting_name: "  ".to_string(),
            host_identity: "alice".to_string(),
        };

        assert_eq!(request.validate().unwrap_err(), "Meeting name is required");
    }

    #[test]
    fn test_update_meeting_request_validation_long_name() {
        let request = UpdateMeetingRequest {
            room_name: "abc-defg-hij".to_string(),
            meeting_name: "a".repeat(101),
            host_identity: "alice".to_string(),
        };

        assert_eq!(
            request.validate().unwrap_err(),
            "Meeting name must be at most 100 characters"
        );
    }

    #[test]
    fn test_update_meeting_request_validation_name_at_limit() {
        let request = UpdateMeetingRequest {
            room_name: "abc-defg-hij".to_string(),
            meeting_name: "a".repeat(100),
            host_identity: "alice".to_string(),
        };

        assert!(request.validate().is_ok(), "100 characters should pass");
    }

    #[test]
    fn test_update_meeting_request_validation_empty_host() {
        let request = UpdateMeetingRequest {
            room_name: "abc-defg-hij".to_string(),
            meeting_name: "Weekly Sync".to_string(),
            host_identity: String::new(),
        };

        assert_eq!(request.validate().unwrap_err(), "Host identity is required");
    }

    // ========================================================================
    // TokenRequest
    // ========================================================================

    #[test]
    fn test_token_request_deserialization() {
        let json = r#"{"roomName":"abc-defg-hij","participantName":"Alice","isHost":true,"accentColor":"purple"}"#;
        let request: TokenRequest =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(request.room_name, "abc-defg-hij");
        assert_eq!(request.participant_name, "Alice");
        assert!(request.is_host);
        assert_eq!(request.accent_color.as_deref(), Some("purple"));
    }

    #[test]
    fn test_token_request_minimal() {
        let json = r#"{"roomName":"abc-defg-hij","participantName":"Bob"}"#;
        let request: TokenRequest =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert!(!request.is_host);
        assert_eq!(request.accent_color, None);
    }

    #[test]
    fn test_token_request_rejects_unknown_fields() {
        let json = r#"{"roomName":"a","participantName":"b","extra":"c"}"#;
        let result: Result<TokenRequest, _> = serde_json::from_str(json);

        assert!(result.is_err(), "Should reject unknown fields");
    }

    #[test]
    fn test_token_request_validation_empty_name() {
        let request = TokenRequest {
            room_name: "abc-defg-hij".to_string(),
            participant_name: "   ".to_string(),
            is_host: false,
            accent_color: None,
        };

        assert_eq!(
            request.validate().unwrap_err(),
            "Participant name is required"
        );
    }

    #[test]
    fn test_token_request_validation_long_name() {
        let request = TokenRequest {
            room_name: "abc-defg-hij".to_string(),
            participant_name: "n".repeat(101),
            is_host: false,
            accent_color: None,
        };

        assert_eq!(
            request.validate().unwrap_err(),
            "Participant name must be at most 100 characters"
        );
    }

    #[test]
    fn test_token_request_validation_trims_before_check() {
        let request = TokenRequest {
            room_name: "abc-defg-hij".to_string(),
            participant_name: format!("  {}  ", "n".repeat(100)),
            is_host: false,
            accent_color: None,
        };

        assert!(request.validate().is_ok(), "Length applies after trimming");
    }
}
