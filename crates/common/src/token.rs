//! Room access tokens.
//!
//! A join credential is an HS256 JWT minted by the room service and
//! presented both to the media backend (to join a room) and back to the
//! room service (to authorize host-only operations). Host authority is
//! a signed claim, the `video.roomAdmin` grant, never a client-supplied
//! flag: whoever holds a token with `roomAdmin` for a room is that
//! room's host, and nothing else is.
//!
//! # Security
//!
//! - Token size is checked BEFORE any parsing (denial-of-service prevention)
//! - Signature, expiry, not-before, and issuer are all verified
//! - Clock skew tolerance is bounded by [`DEFAULT_CLOCK_SKEW`]
//! - Claims `Debug` output redacts the participant identity

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes.
///
/// Tokens larger than this are rejected before any base64 or JSON
/// parsing happens. Legitimate room tokens are well under 2 KB.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Clock skew tolerated when checking `exp` and `nbf`.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Default lifetime of a join credential (6 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(21_600);

// =============================================================================
// Errors
// =============================================================================

/// Errors from minting or verifying room access tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token exceeds [`MAX_TOKEN_SIZE_BYTES`].
    #[error("token exceeds maximum allowed size")]
    TokenTooLarge,

    /// Token signature is valid but the token has expired.
    #[error("token has expired")]
    Expired,

    /// Any other verification failure (bad signature, wrong issuer,
    /// malformed structure, not yet valid). Collapsed deliberately so
    /// callers cannot leak which check failed.
    #[error("token verification failed")]
    Invalid,

    /// Encoding the claims failed.
    #[error("token encoding failed")]
    Encoding,
}

// =============================================================================
// Types
// =============================================================================

/// Permission grants for the media backend's room scope.
///
/// Wire form follows the backend's camelCase convention, e.g.
/// `{"room":"abc-defg-hij","roomJoin":true,"canPublish":true,...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoGrants {
    /// Room the grants are scoped to. Absent for list-only tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// May join the room as a participant.
    pub room_join: bool,
    /// May enumerate rooms (service-to-service use only).
    pub room_list: bool,
    /// May administer the room: update metadata, remove participants.
    /// This grant IS host authority.
    pub room_admin: bool,
    /// May publish audio and video tracks.
    pub can_publish: bool,
    /// May subscribe to other participants' tracks.
    pub can_subscribe: bool,
    /// May publish to the room's data channel.
    pub can_publish_data: bool,
}

impl VideoGrants {
    /// Grants for a regular participant joining a room.
    #[must_use]
    pub fn participant(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            ..Self::default()
        }
    }

    /// Grants for the meeting host: participant grants plus room
    /// administration.
    #[must_use]
    pub fn host(room: &str) -> Self {
        Self {
            room_admin: true,
            ..Self::participant(room)
        }
    }

    /// Service-side grants for enumerating rooms.
    #[must_use]
    pub fn list_only() -> Self {
        Self {
            room_list: true,
            ..Self::default()
        }
    }

    /// Service-side grants for administering a single room without
    /// joining it.
    #[must_use]
    pub fn metadata_admin(room: &str) -> Self {
        Self {
            room: Some(room.to_string()),
            room_admin: true,
            ..Self::default()
        }
    }
}

/// Claims carried by a room access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoomAccessClaims {
    /// API key that minted the token.
    pub iss: String,
    /// Participant identity.
    pub sub: String,
    /// Display name shown to other participants.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Not valid before (Unix epoch seconds).
    pub nbf: i64,
    /// Expiry (Unix epoch seconds).
    pub exp: i64,
    /// Participant metadata blob, see [`crate::metadata::ParticipantMetadata`].
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<String>,
    /// Room-scope permission grants.
    #[serde(default)]
    pub video: VideoGrants,
}

impl RoomAccessClaims {
    /// Build claims valid from now until `ttl` from now.
    #[must_use]
    pub fn new(api_key: &str, identity: &str, grants: VideoGrants, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        // Safe cast: TTL is bounds-checked at config load, far below i64::MAX
        #[allow(clippy::cast_possible_wrap)]
        let ttl_secs = ttl.as_secs() as i64;

        Self {
            iss: api_key.to_string(),
            sub: identity.to_string(),
            name: None,
            nbf: now,
            exp: now.saturating_add(ttl_secs),
            metadata: None,
            video: grants,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Attach a participant metadata blob.
    #[must_use]
    pub fn with_metadata(mut self, blob: String) -> Self {
        self.metadata = Some(blob);
        self
    }

    /// True when the claims carry host authority for the given room.
    ///
    /// Both conditions must hold: the `roomAdmin` grant is present AND
    /// the grants are scoped to this exact room. A host token for one
    /// meeting confers nothing in another.
    #[must_use]
    pub fn authorizes_host(&self, room: &str) -> bool {
        self.video.room_admin && self.video.room.as_deref() == Some(room)
    }
}

impl fmt::Debug for RoomAccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomAccessClaims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("name", &self.name)
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("metadata", &self.metadata)
            .field("video", &self.video)
            .finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Mint a signed room access token from the given claims.
///
/// # Errors
///
/// Returns [`TokenError::Encoding`] if JWT encoding fails.
pub fn mint(claims: &RoomAccessClaims, api_secret: &SecretString) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(api_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(target: "common.token", error = %e, "Failed to encode room token");
        TokenError::Encoding
    })
}

/// Verify a room access token and return its claims.
///
/// Checks, in order: size cap, HS256 signature, `exp` and `nbf` with
/// [`DEFAULT_CLOCK_SKEW`] leeway, and that `iss` matches `api_key`.
///
/// # Errors
///
/// - [`TokenError::TokenTooLarge`] before any parsing if oversized
/// - [`TokenError::Expired`] for a valid but expired token
/// - [`TokenError::Invalid`] for every other failure
pub fn verify(
    token: &str,
    api_key: &str,
    api_secret: &SecretString,
) -> Result<RoomAccessClaims, TokenError> {
    // Check token size first (DoS prevention)
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "common.token",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::TokenTooLarge);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = DEFAULT_CLOCK_SKEW.as_secs();
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "nbf"]);
    validation.set_issuer(&[api_key]);

    decode::<RoomAccessClaims>(
        token,
        &DecodingKey::from_secret(api_secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => {
            tracing::debug!(target: "common.token", error = %e, "Token verification failed");
            TokenError::Invalid
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
