//! Room and participant metadata payloads.
//!
//! Both payloads travel as JSON strings inside opaque metadata fields
//! on the media backend, so parsing is deliberately lenient: an empty
//! or malformed blob decodes to the default value instead of erroring.
//! A meeting must stay joinable even when its metadata was written by
//! an older client or corrupted in transit.

use serde::{Deserialize, Serialize};

// =============================================================================
// Room metadata
// =============================================================================

/// Display metadata attached to a room by its host.
///
/// Serialized form: `{"meetingName":"Standup","hostIdentity":"alice"}`.
/// Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomMetadata {
    /// Human-readable meeting name shown in headers and tab titles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_name: Option<String>,
    /// Identity of the participant who created the meeting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_identity: Option<String>,
}

impl RoomMetadata {
    /// Decode a metadata blob, tolerating empty and malformed input.
    ///
    /// Returns the default (both fields absent) when the blob is empty
    /// or is not the expected JSON shape.
    #[must_use]
    pub fn from_blob(blob: &str) -> Self {
        if blob.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(blob).unwrap_or_else(|e| {
            tracing::debug!(
                target: "common.metadata",
                error = %e,
                "Ignoring malformed room metadata"
            );
            Self::default()
        })
    }

    /// Encode to the blob form stored on the media backend.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails, which for
    /// this struct only happens under allocation failure.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Participant metadata
// =============================================================================

/// Per-participant metadata embedded in the join token.
///
/// Serialized form: `{"accentColor":"#3B82F6","isHost":true}`. The
/// accent color travels as a hex value so remote clients can render it
/// without knowing the palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantMetadata {
    /// Accent color as a `#RRGGBB` hex string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    /// Whether this participant created the meeting.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_host: bool,
}

impl ParticipantMetadata {
    /// Decode a metadata blob, tolerating empty and malformed input.
    #[must_use]
    pub fn from_blob(blob: &str) -> Self {
        if blob.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(blob).unwrap_or_else(|e| {
            tracing::debug!(
                target: "common.metadata",
                error = %e,
                "Ignoring malformed participant metadata"
            );
            Self::default()
        })
    }

    /// Encode to the blob form carried in the join token.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Accent colors
// =============================================================================

/// The accent color palette.
///
/// Stored in settings by id (`"blue"`) and rendered by hex value. The
/// palette is fixed; unknown ids fall back to [`AccentColor::default`]
/// rather than failing, since accent color is cosmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    Pink,
    Purple,
    #[default]
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl AccentColor {
    /// All palette entries, in display order.
    pub const ALL: [AccentColor; 7] = [
        AccentColor::Pink,
        AccentColor::Purple,
        AccentColor::Blue,
        AccentColor::Green,
        AccentColor::Yellow,
        AccentColor::Orange,
        AccentColor::Red,
    ];

    /// Stable lowercase id used in settings storage and API payloads.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            AccentColor::Pink => "pink",
            AccentColor::Purple => "purple",
            AccentColor::Blue => "blue",
            AccentColor::Green => "green",
            AccentColor::Yellow => "yellow",
            AccentColor::Orange => "orange",
            AccentColor::Red => "red",
        }
    }

    /// Hex value rendered by clients.
    #[must_use]
    pub fn as_hex(self) -> &'static str {
        match self {
            AccentColor::Pink => "#EC4899",
            AccentColor::Purple => "#A855F7",
            AccentColor::Blue => "#3B82F6",
            AccentColor::Green => "#22C55E",
            AccentColor::Yellow => "#EAB308",
            AccentColor::Orange => "#F97316",
            AccentColor::Red => "#EF4444",
        }
    }

    /// Look up a palette entry by its id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Look up a palette entry by its hex value (case-insensitive).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_hex().eq_ignore_ascii_case(hex))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // RoomMetadata Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_room_metadata_round_trip() {
        let meta = RoomMetadata {
            meeting_name: Some("Standup".to_string()),
            host_identity: Some("alice".to_string()),
        };
        let blob = meta.to_blob().unwrap();
        assert_eq!(blob, r#"{"meetingName":"Standup","hostIdentity":"alice"}"#);
        assert_eq!(RoomMetadata::from_blob(&blob), meta);
    }

    #[test]
    fn test_room_metadata_empty_blob_is_default() {
        assert_eq!(RoomMetadata::from_blob(""), RoomMetadata::default());
        assert_eq!(RoomMetadata::from_blob("   "), RoomMetadata::default());
    }

    #[test]
    fn test_room_metadata_malformed_blob_is_default() {
        assert_eq!(RoomMetadata::from_blob("not json"), RoomMetadata::default());
        assert_eq!(RoomMetadata::from_blob("[1,2,3]"), RoomMetadata::default());
        assert_eq!(RoomMetadata::from_blob("{"), RoomMetadata::default());
    }

    #[test]
    fn test_room_metadata_partial_blob() {
        let meta = RoomMetadata::from_blob(r#"{"meetingName":"Planning"}"#);
        assert_eq!(meta.meeting_name.as_deref(), Some("Planning"));
        assert_eq!(meta.host_identity, None);
    }

    #[test]
    fn test_room_metadata_ignores_unknown_fields() {
        let meta = RoomMetadata::from_blob(
            r#"{"meetingName":"Sync","hostIdentity":"bob","theme":"dark"}"#,
        );
        assert_eq!(meta.meeting_name.as_deref(), Some("Sync"));
        assert_eq!(meta.host_identity.as_deref(), Some("bob"));
    }

    #[test]
    fn test_room_metadata_absent_fields_not_serialized() {
        let blob = RoomMetadata::default().to_blob().unwrap();
        assert_eq!(blob, "{}");
    }

    // -------------------------------------------------------------------------
    // ParticipantMetadata Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_participant_metadata_round_trip() {
        let meta = ParticipantMetadata {
            accent_color: Some("#3B82F6".to_string()),
            is_host: true,
        };
        let blob = meta.to_blob().unwrap();
        assert_eq!(blob, r##"{"accentColor":"#3B82F6","isHost":true}"##);
        assert_eq!(ParticipantMetadata::from_blob(&blob), meta);
    }

    #[test]
    fn test_participant_metadata_is_host_omitted_when_false() {
        let meta = ParticipantMetadata {
            accent_color: Some("#EF4444".to_string()),
            is_host: false,
        };
        let blob = meta.to_blob().unwrap();
        assert_eq!(blob, r##"{"accentColor":"#EF4444"}"##);
    }

    #[test]
    fn test_participant_metadata_lenient_decode() {
        assert_eq!(
            ParticipantMetadata::from_blob("garbage"),
            ParticipantMetadata::default()
        );
        let meta = ParticipantMetadata::from_blob(r#"{"isHost":true}"#);
        assert!(meta.is_host);
        assert_eq!(meta.accent_color, None);
    }

    // -------------------------------------------------------------------------
    // AccentColor Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_accent_color_default_is_blue() {
        assert_eq!(AccentColor::default(), AccentColor::Blue);
    }

    #[test]
    fn test_accent_color_palette_hex_values() {
        assert_eq!(AccentColor::Pink.as_hex(), "#EC4899");
        assert_eq!(AccentColor::Purple.as_hex(), "#A855F7");
        assert_eq!(AccentColor::Blue.as_hex(), "#3B82F6");
        assert_eq!(AccentColor::Green.as_hex(), "#22C55E");
        assert_eq!(AccentColor::Yellow.as_hex(), "#EAB308");
        assert_eq!(AccentColor::Orange.as_hex(), "#F97316");
        assert_eq!(AccentColor::Red.as_hex(), "#EF4444");
    }

    #[test]
    fn test_accent_color_id_round_trip() {
        for color in AccentColor::ALL {
            assert_eq!(AccentColor::from_id(color.id()), Some(color));
        }
    }

    #[test]
    fn test_accent_color_hex_round_trip() {
        for color in AccentColor::ALL {
            assert_eq!(AccentColor::from_hex(color.as_hex()), Some(color));
        }
    }

    #[test]
    fn test_accent_color_from_hex_case_insensitive() {
        assert_eq!(AccentColor::from_hex("#ec4899"), Some(AccentColor::Pink));
    }

    #[test]
    fn test_accent_color_unknown_id_is_none() {
        assert_eq!(AccentColor::from_id("magenta"), None);
        assert_eq!(AccentColor::from_id("Blue"), None);
        assert_eq!(AccentColor::from_id(""), None);
    }

    #[test]
    fn test_accent_color_serde_uses_id() {
        let json = serde_json::to_string(&AccentColor::Green).unwrap();
        assert_eq!(json, r#""green""#);
        let color: AccentColor = serde_json::from_str(r#""orange""#).unwrap();
        assert_eq!(color, AccentColor::Orange);
    }
}
