//! Join token handler for the room service.
//!
//! Implements `POST /token`: mint a signed join credential for a
//! participant entering a meeting.
//!
//! # Security
//!
//! - Room names must be canonical meeting codes; arbitrary room names
//!   are rejected before any credential is built, so tokens can never
//!   grant access outside the meeting namespace
//! - Host authority is granted solely from the request flag; the first
//!   participant to claim host for a fresh code becomes its host
//! - Tokens are signed with the media backend API secret and are only
//!   as long-lived as the configured TTL

use crate::models::{ErrorMessage, TokenRequest, TokenResponse};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::code::MeetingCode;
use common::metadata::{AccentColor, ParticipantMetadata};
use common::token::{self, RoomAccessClaims, VideoGrants};
use std::sync::Arc;
use tracing::{error, info, instrument};

// ============================================================================
// Handler: POST /token
// ============================================================================

/// Handler for POST /token
///
/// Issue a signed join token and the media backend connection URL for
/// the named meeting. Client-chosen accent color ids are resolved to
/// their palette hex; anything unrecognized falls back to the default.
///
/// # Response
///
/// - 200 OK: `{ "token": "<jwt>", "wsUrl": "wss://..." }`
/// - 400 Bad Request: unparseable body, non-canonical room name, or
///   invalid participant name
/// - 500 Internal Server Error: credentials not configured, or signing
///   failure
#[instrument(
    skip_all,
    name = "rs.token.issue",
    fields(
        method = "POST",
        endpoint = "/token",
        status = tracing::field::Empty,
    )
)]
pub async fn issue_token(State(state): State<Arc<AppState>>, body: axum::body::Bytes) -> Response {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: TokenRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(target: "rs.handlers.tokens", error = %e, "Invalid request body");
            metrics::record_token_issued("bad_request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorMessage::new("Invalid request body")),
            )
                .into_response();
        }
    };

    // Canonical-code gate: the room namespace is exactly the set of
    // codes this service can generate.
    let Ok(code) = request.room_name.parse::<MeetingCode>() else {
        metrics::record_token_issued("bad_request");
        tracing::debug!(
            target: "rs.handlers.tokens",
            "Join request named a non-canonical room"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorMessage::new("Invalid meeting code")),
        )
            .into_response();
    };

    if let Err(e) = request.validate() {
        metrics::record_token_issued("bad_request");
        return (StatusCode::BAD_REQUEST, Json(ErrorMessage::new(e))).into_response();
    }

    let Some(media) = state.config.media.as_ref() else {
        metrics::record_token_issued("not_configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorMessage::new("Media backend not configured")),
        )
            .into_response();
    };

    let participant_name = request.participant_name.trim();

    let accent = request
        .accent_color
        .as_deref()
        .and_then(AccentColor::from_id)
        .unwrap_or_default();
    let metadata = ParticipantMetadata {
        accent_color: Some(accent.as_hex().to_string()),
        is_host: request.is_host,
    };
    let blob = match metadata.to_blob() {
        Ok(blob) => blob,
        Err(e) => {
            metrics::record_token_issued("error");
            error!(target: "rs.handlers.tokens", error = %e, "Failed to encode participant metadata");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("Failed to issue token")),
            )
                .into_response();
        }
    };

    let grants = if request.is_host {
        VideoGrants::host(code.as_str())
    } else {
        VideoGrants::participant(code.as_str())
    };

    let claims = RoomAccessClaims::new(
        &media.api_key,
        participant_name,
        grants,
        state.config.token_ttl,
    )
    .with_name(participant_name)
    .with_metadata(blob);

    match token::mint(&claims, &media.api_secret) {
        Ok(jwt) => {
            metrics::record_token_issued("success");
            info!(
                target: "rs.handlers.tokens",
                room = %code,
                is_host = request.is_host,
                "Join token issued"
            );
            (
                StatusCode::OK,
                Json(TokenResponse {
                    token: jwt,
                    ws_url: media.url.clone(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_token_issued("error");
            error!(target: "rs.handlers.tokens", error = %e, "Failed to sign join token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage::new("Failed to issue token")),
            )
                .into_response()
        }
    }
}
