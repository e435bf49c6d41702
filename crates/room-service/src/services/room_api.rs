//! Media backend room API client.
//!
//! Server-side HTTP client for the media backend's room management
//! endpoints, used to look up rooms during meeting validation and to
//! store room metadata on behalf of the host.
//!
//! # Security
//!
//! - Every request carries a short-lived admin token minted from the
//!   configured credential pair, scoped to the minimum grants the
//!   endpoint needs (room list for lookups, metadata admin for writes)
//! - Timeouts prevent hanging connections
//! - Errors are logged server-side with generic messages returned

use async_trait::async_trait;
use common::secret::SecretString;
use common::token::{self, RoomAccessClaims, VideoGrants};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, instrument, warn};

use crate::config::MediaBackendConfig;
use crate::observability::record_backend_request;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for room API requests in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Connect timeout for room API requests in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// TTL for the short-lived admin tokens minted per request.
const ADMIN_TOKEN_TTL: Duration = Duration::from_secs(600);

/// Identity claimed by service-minted admin tokens.
const SERVICE_IDENTITY: &str = "room-service";

// ============================================================================
// Errors
// ============================================================================

/// Room API error type.
#[derive(Debug, Error)]
pub enum RoomApiError {
    /// Backend unreachable, timed out, or returned a server error.
    #[error("Media backend unavailable: {0}")]
    Unavailable(String),

    /// The named room does not exist.
    #[error("Room not found")]
    RoomNotFound,

    /// Backend rejected the request (bad parameters or credentials).
    #[error("Media backend rejected the request: {0}")]
    Rejected(String),

    /// Backend returned a body this client cannot decode.
    #[error("Invalid media backend response: {0}")]
    InvalidResponse(String),

    /// Client-side failure (admin token minting, client construction).
    #[error("Room API internal error: {0}")]
    Internal(String),
}

impl RoomApiError {
    /// Metrics label for the error variant. Bounded cardinality.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            RoomApiError::Unavailable(_) => "unavailable",
            RoomApiError::RoomNotFound => "not_found",
            RoomApiError::Rejected(_) => "rejected",
            RoomApiError::InvalidResponse(_) => "invalid_response",
            RoomApiError::Internal(_) => "internal",
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Room state reported by the media backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Room name (the meeting code).
    pub name: String,

    /// Opaque metadata blob stored with the room. Empty when unset.
    #[serde(default)]
    pub metadata: String,

    /// Current participant count.
    #[serde(default)]
    pub num_participants: u32,

    /// Room creation time (unix seconds).
    #[serde(default)]
    pub creation_time: i64,
}

/// Request body for `POST /api/v1/rooms/list`.
#[derive(Debug, Serialize)]
struct ListRoomsRequest {
    names: Vec<String>,
}

/// Response body for `POST /api/v1/rooms/list`.
#[derive(Debug, Deserialize)]
struct ListRoomsResponse {
    rooms: Vec<RoomInfo>,
}

/// Request body for `POST /api/v1/rooms/metadata`.
#[derive(Debug, Serialize)]
struct UpdateMetadataRequest {
    room: String,
    metadata: String,
}

/// Response body for `POST /api/v1/rooms/metadata`.
#[derive(Debug, Deserialize)]
struct UpdateMetadataResponse {
    room: RoomInfo,
}

// ============================================================================
// Trait
// ============================================================================

/// Media backend room API seam.
///
/// Handlers depend on this trait so tests can substitute a scripted
/// backend without network I/O.
#[async_trait]
pub trait RoomApi: Send + Sync {
    /// Look up a room by name. `Ok(None)` means the room does not exist.
    async fn find_room(&self, name: &str) -> Result<Option<RoomInfo>, RoomApiError>;

    /// Replace the stored metadata blob for an existing room.
    async fn update_room_metadata(
        &self,
        room: &str,
        metadata: &str,
    ) -> Result<RoomInfo, RoomApiError>;
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the media backend room API.
#[derive(Clone)]
pub struct RoomApiClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// http(s) base derived from the configured ws(s) URL.
    http_base: String,

    /// Media backend API key (admin token issuer).
    api_key: String,

    /// Media backend API secret (admin token signing key).
    api_secret: SecretString,
}

impl RoomApiClient {
    /// Create a new room API client from the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns `RoomApiError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &MediaBackendConfig) -> Result<Self, RoomApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "rs.services.room_api", error = %e, "Failed to build HTTP client");
                RoomApiError::Internal("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            http_base: http_base_for(&config.url),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Mint a short-lived admin token scoped to the given grants.
    fn admin_token(&self, grants: VideoGrants) -> Result<String, RoomApiError> {
        let claims = RoomAccessClaims::new(&self.api_key, SERVICE_IDENTITY, grants, ADMIN_TOKEN_TTL);

        token::mint(&claims, &self.api_secret).map_err(|e| {
            error!(target: "rs.services.room_api", error = %e, "Failed to mint admin token");
            RoomApiError::Internal("Failed to mint admin token".to_string())
        })
    }

    /// POST a JSON body to a room API endpoint and return the raw response.
    async fn post(
        &self,
        path: &str,
        token: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, RoomApiError> {
        let url = format!("{}{}", self.http_base, path);

        self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "rs.services.room_api", error = %e, "Room API request failed");
                RoomApiError::Unavailable("Media backend is unreachable".to_string())
            })
    }

    /// Map a non-success room API status to an error.
    async fn handle_error_status(response: reqwest::Response) -> RoomApiError {
        let status = response.status();

        if status.is_server_error() {
            warn!(target: "rs.services.room_api", status = %status, "Room API returned server error");
            RoomApiError::Unavailable("Media backend is unavailable".to_string())
        } else if status.as_u16() == 404 {
            RoomApiError::RoomNotFound
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            // The admin token was refused, which points at the configured
            // credential pair rather than the caller's request.
            error!(target: "rs.services.room_api", status = %status, "Admin token rejected by media backend");
            RoomApiError::Rejected("Admin token rejected".to_string())
        } else if status.as_u16() == 400 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(target: "rs.services.room_api", status = %status, body = %error_body, "Room API returned bad request");
            RoomApiError::Rejected("Invalid room API request".to_string())
        } else {
            warn!(target: "rs.services.room_api", status = %status, "Unexpected room API response");
            RoomApiError::Internal(format!("Unexpected status {}", status))
        }
    }
}

#[async_trait]
impl RoomApi for RoomApiClient {
    #[instrument(skip(self), fields(room = %name))]
    async fn find_room(&self, name: &str) -> Result<Option<RoomInfo>, RoomApiError> {
        let start = Instant::now();
        let result = self.find_room_inner(name).await;

        match &result {
            Ok(_) => record_backend_request("rooms_list", "success", start.elapsed()),
            Err(e) => record_backend_request("rooms_list", e.error_type(), start.elapsed()),
        }

        result
    }

    #[instrument(skip(self, metadata), fields(room = %room))]
    async fn update_room_metadata(
        &self,
        room: &str,
        metadata: &str,
    ) -> Result<RoomInfo, RoomApiError> {
        let start = Instant::now();
        let result = self.update_room_metadata_inner(room, metadata).await;

        match &result {
            Ok(_) => record_backend_request("rooms_metadata", "success", start.elapsed()),
            Err(e) => record_backend_request("rooms_metadata", e.error_type(), start.elapsed()),
        }

        result
    }
}

impl RoomApiClient {
    async fn find_room_inner(&self, name: &str) -> Result<Option<RoomInfo>, RoomApiError> {
        let token = self.admin_token(VideoGrants::list_only())?;
        let body = ListRoomsRequest {
            names: vec![name.to_string()],
        };

        let response = self.post("/api/v1/rooms/list", &token, &body).await?;

        if !response.status().is_success() {
            return Err(Self::handle_error_status(response).await);
        }

        let listed: ListRoomsResponse = response.json().await.map_err(|e| {
            error!(target: "rs.services.room_api", error = %e, "Failed to parse room list response");
            RoomApiError::InvalidResponse("Unparseable room list".to_string())
        })?;

        Ok(listed.rooms.into_iter().find(|r| r.name == name))
    }

    async fn update_room_metadata_inner(
        &self,
        room: &str,
        metadata: &str,
    ) -> Result<RoomInfo, RoomApiError> {
        let token = self.admin_token(VideoGrants::metadata_admin(room))?;
        let body = UpdateMetadataRequest {
            room: room.to_string(),
            metadata: metadata.to_string(),
        };

        let response = self.post("/api/v1/rooms/metadata", &token, &body).await?;

        if !response.status().is_success() {
            return Err(Self::handle_error_status(response).await);
        }

        let updated: UpdateMetadataResponse = response.json().await.map_err(|e| {
            error!(target: "rs.services.room_api", error = %e, "Failed to parse metadata response");
            RoomApiError::InvalidResponse("Unparseable metadata response".to_string())
        })?;

        Ok(updated.room)
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Derive the http(s) room API base from the client-facing ws(s) URL.
///
/// Already-http(s) URLs pass through unchanged. A trailing slash is
/// stripped so endpoint paths can be appended directly.
fn http_base_for(ws_url: &str) -> String {
    let base = if let Some(rest) = ws_url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = ws_url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        ws_url.to_string()
    };

    base.trim_end_matches('/').to_string()
}

// ============================================================================
// Tests
// ============================================================================
