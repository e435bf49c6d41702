//! Participant model and roster bookkeeping.
//!
//! The roster is owned by the session actor and includes the local
//! participant. Entries keep display order (local first, then join
//! order), which is what the shell renders.
//!
//! Host status comes from the decoded `isHost` flag in the participant
//! metadata, never from mere metadata presence: every participant
//! carries a metadata blob (accent color), so presence proves nothing.

use common::metadata::{AccentColor, ParticipantMetadata};

use crate::devices::DeviceKind;
use crate::events::ParticipantInfo;

/// A participant in the call, local or remote.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Stable identity assigned at token issuance.
    pub identity: String,
    /// Display name. Falls back to the identity when the backend
    /// reports none.
    pub name: String,
    /// Whether the microphone is currently enabled.
    pub microphone_enabled: bool,
    /// Whether the camera is currently enabled.
    pub camera_enabled: bool,
    /// Whether the participant is actively speaking.
    pub speaking: bool,
    /// Decoded participant metadata. Malformed blobs decode to the
    /// default.
    pub metadata: ParticipantMetadata,
    /// Whether this entry is the local participant.
    pub is_local: bool,
}

impl Participant {
    /// Build a remote participant from backend-reported facts.
    #[must_use]
    pub fn from_info(info: ParticipantInfo) -> Self {
        let metadata = info
            .metadata
            .as_deref()
            .map(ParticipantMetadata::from_blob)
            .unwrap_or_default();
        let name = info.name.unwrap_or_else(|| info.identity.clone());
        Self {
            identity: info.identity,
            name,
            microphone_enabled: info.microphone_enabled,
            camera_enabled: info.camera_enabled,
            speaking: false,
            metadata,
            is_local: false,
        }
    }

    /// Whether this participant created the meeting.
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.metadata.is_host
    }

    /// Accent color to render for this participant. Unknown or absent
    /// hex values fall back to the default palette entry.
    #[must_use]
    pub fn accent_color(&self) -> AccentColor {
        self.metadata
            .accent_color
            .as_deref()
            .and_then(AccentColor::from_hex)
            .unwrap_or_default()
    }
}

/// Ordered set of call participants, local participant included.
#[derive(Debug)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Create a roster seeded with the local participant.
    #[must_use]
    pub fn new(local: Participant) -> Self {
        Self {
            participants: vec![local],
        }
    }

    /// Insert or refresh a remote participant from backend facts.
    /// Existing entries keep their position and speaking state.
    pub fn upsert(&mut self, info: ParticipantInfo) {
        if let Some(existing) = self
            .participants
            .iter_mut()
            .find(|p| p.identity == info.identity)
        {
            let speaking = existing.speaking;
            let is_local = existing.is_local;
            *existing = Participant::from_info(info);
            existing.speaking = speaking;
            existing.is_local = is_local;
        } else {
            self.participants.push(Participant::from_info(info));
        }
    }

    /// Remove a participant by identity.
    pub fn remove(&mut self, identity: &str) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.identity == identity)?;
        Some(self.participants.remove(index))
    }

    /// Look up a participant by identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.identity == identity)
    }

    /// Mark exactly the given identities as speaking.
    pub fn set_speaking(&mut self, identities: &[String]) {
        for participant in &mut self.participants {
            participant.speaking = identities.iter().any(|id| *id == participant.identity);
        }
    }

    /// Update a participant's microphone or camera enabled flag.
    /// Unknown identities are ignored.
    pub fn set_track_enabled(&mut self, identity: &str, kind: DeviceKind, enabled: bool) {
        if let Some(participant) = self.participants.iter_mut().find(|p| p.identity == identity) {
            match kind {
                DeviceKind::Microphone => participant.microphone_enabled = enabled,
                DeviceKind::Camera => participant.camera_enabled = enabled,
            }
        }
    }

    /// Re-decode a participant's metadata from a fresh blob.
    pub fn set_metadata(&mut self, identity: &str, blob: &str) {
        if let Some(participant) = self.participants.iter_mut().find(|p| p.identity == identity) {
            participant.metadata = ParticipantMetadata::from_blob(blob);
        }
    }

    /// All participants in display order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participant count, local included. Drives the bitrate policy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// A roster is never empty while the session lives, but the
    /// conventional pair keeps clippy satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn local() -> Participant {
        Participant {
            identity: "alice".to_string(),
            name: "Alice".to_string(),
            microphone_enabled: true,
            camera_enabled: true,
            speaking: false,
            metadata: ParticipantMetadata {
                accent_color: Some(AccentColor::Green.as_hex().to_string()),
                is_host: true,
            },
            is_local: true,
        }
    }

    fn remote(identity: &str, metadata: Option<&str>) -> ParticipantInfo {
        ParticipantInfo {
            identity: identity.to_string(),
            name: Some(identity.to_uppercase()),
            metadata: metadata.map(str::to_string),
            microphone_enabled: true,
            camera_enabled: true,
        }
    }

    #[test]
    fn test_roster_starts_with_local() {
        let roster = Roster::new(local());
        assert_eq!(roster.len(), 1);
        assert!(roster.get("alice").unwrap().is_local);
    }

    #[test]
    fn test_upsert_appends_in_join_order() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));
        roster.upsert(remote("carol", None));

        let identities: Vec<&str> = roster
            .participants()
            .iter()
            .map(|p| p.identity.as_str())
            .collect();
        assert_eq!(identities, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_upsert_refreshes_existing_in_place() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));
        roster.upsert(remote("carol", None));
        roster.set_speaking(&["bob".to_string()]);

        let mut update = remote("bob", None);
        update.camera_enabled = false;
        roster.upsert(update);

        let bob = roster.get("bob").unwrap();
        assert!(!bob.camera_enabled);
        // Position and speaking state survive the refresh
        assert!(bob.speaking);
        assert_eq!(roster.participants().get(1).unwrap().identity, "bob");
    }

    #[test]
    fn test_host_requires_decoded_is_host_flag() {
        let mut roster = Roster::new(local());
        // Metadata present but no isHost flag: not a host
        roster.upsert(remote("bob", Some(r##"{"accentColor":"#EC4899"}"##)));
        roster.upsert(remote("carol", Some(r#"{"isHost":true}"#)));

        assert!(!roster.get("bob").unwrap().is_host());
        assert!(roster.get("carol").unwrap().is_host());
    }

    #[test]
    fn test_malformed_metadata_decodes_to_default() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", Some("not json at all")));

        let bob = roster.get("bob").unwrap();
        assert!(!bob.is_host());
        assert_eq!(bob.accent_color(), AccentColor::default());
    }

    #[test]
    fn test_accent_color_falls_back_on_unknown_hex() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", Some(r##"{"accentColor":"#123456"}"##)));
        roster.upsert(remote("carol", Some(r##"{"accentColor":"#ec4899"}"##)));

        assert_eq!(
            roster.get("bob").unwrap().accent_color(),
            AccentColor::default()
        );
        // Hex lookup is case-insensitive
        assert_eq!(
            roster.get("carol").unwrap().accent_color(),
            AccentColor::Pink
        );
    }

    #[test]
    fn test_name_falls_back_to_identity() {
        let mut roster = Roster::new(local());
        roster.upsert(ParticipantInfo {
            identity: "bob".to_string(),
            name: None,
            metadata: None,
            microphone_enabled: false,
            camera_enabled: false,
        });
        assert_eq!(roster.get("bob").unwrap().name, "bob");
    }

    #[test]
    fn test_speaking_set_is_exact() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));
        roster.upsert(remote("carol", None));

        roster.set_speaking(&["alice".to_string(), "carol".to_string()]);
        assert!(roster.get("alice").unwrap().speaking);
        assert!(!roster.get("bob").unwrap().speaking);
        assert!(roster.get("carol").unwrap().speaking);

        roster.set_speaking(&[]);
        assert!(!roster.get("alice").unwrap().speaking);
        assert!(!roster.get("carol").unwrap().speaking);
    }

    #[test]
    fn test_track_enabled_updates() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));

        roster.set_track_enabled("bob", DeviceKind::Camera, false);
        roster.set_track_enabled("bob", DeviceKind::Microphone, false);
        let bob = roster.get("bob").unwrap();
        assert!(!bob.camera_enabled);
        assert!(!bob.microphone_enabled);

        // Unknown identity is ignored, not an error
        roster.set_track_enabled("nobody", DeviceKind::Camera, true);
    }

    #[test]
    fn test_metadata_change_redecodes() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));
        assert!(!roster.get("bob").unwrap().is_host());

        roster.set_metadata("bob", r##"{"isHost":true,"accentColor":"#F97316"}"##);
        let bob = roster.get("bob").unwrap();
        assert!(bob.is_host());
        assert_eq!(bob.accent_color(), AccentColor::Orange);
    }

    #[test]
    fn test_remove() {
        let mut roster = Roster::new(local());
        roster.upsert(remote("bob", None));
        assert_eq!(roster.len(), 2);

        let removed = roster.remove("bob").unwrap();
        assert_eq!(removed.identity, "bob");
        assert_eq!(roster.len(), 1);
        assert!(roster.remove("bob").is_none());
    }
}
