//! Meeting handlers for the room service.
//!
//! Implements the meeting endpoints:
//!
//! - `POST /meeting` - Issue a fresh meeting code (public)
//! - `GET /meeting?code={code}` - Validate a meeting code (public)
//! - `PATCH /meeting` - Update stored room metadata (host authenticated)
//!
//! # Security
//!
//! - Meeting codes are generated using CSPRNG
//! - PATCH requires a verified join token carrying host authority for
//!   the target room
//! - A room that does not exist and a backend that cannot be reached
//!   validate identically, so probes learn nothing about infrastructure
//! - Error messages are generic to prevent information leakage

use crate::middleware::require_room_token;
use crate::models::{
    ActionOutcome, CreateMeetingResponse, UpdateMeetingRequest, ValidateMeetingResponse,
};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::RoomApiError;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::code::MeetingCode;
use common::metadata::RoomMetadata;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

// ============================================================================
// Handler: POST /meeting
// ============================================================================

/// Handler for POST /meeting
///
/// Issue a fresh meeting code. No room is created on the media backend;
/// the room comes into existence when the first participant connects
/// with a join token naming the code.
///
/// # Response
///
/// - 200 OK: `{ "success": true, "meetingCode": "xxx-xxxx-xxx" }`
/// - 500 Internal Server Error: RNG failure
#[instrument(
    skip_all,
    name = "rs.meeting.create",
    fields(
        method = "POST",
        endpoint = "/meeting",
        status = tracing::field::Empty,
    )
)]
pub async fn create_meeting() -> Response {
    match MeetingCode::generate() {
        Ok(code) => {
            metrics::record_meeting_created("success");
            info!(
                target: "rs.handlers.meetings",
                meeting_code = %code,
                "Meeting code issued"
            );
            (
                StatusCode::OK,
                Json(CreateMeetingResponse {
                    success: true,
                    meeting_code: code.into_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_meeting_created("error");
            error!(target: "rs.handlers.meetings", error = %e, "Failed to generate meeting code");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionOutcome::failed("Failed to create meeting")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Handler: GET /meeting
// ============================================================================

/// Query parameters for meeting validation.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// Meeting code to check.
    pub code: Option<String>,
}

/// Handler for GET /meeting?code={code}
///
/// Check whether a meeting code names a live room and surface its stored
/// metadata. Only a missing or empty `code` is rejected up front;
/// malformed codes flow to the backend lookup and come back invalid,
/// indistinguishable from codes nobody has joined yet.
///
/// # Response
///
/// - 200 OK: `{ "valid": true, "meetingName"?, "hostIdentity"? }` or
///   `{ "valid": false }`
/// - 400 Bad Request: code missing or empty
/// - 500 Internal Server Error: credentials not configured, or an
///   internal fault distinct from backend unavailability
#[instrument(
    skip_all,
    name = "rs.meeting.validate",
    fields(
        method = "GET",
        endpoint = "/meeting",
        status = tracing::field::Empty,
    )
)]
pub async fn validate_meeting(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateQuery>,
) -> Response {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        metrics::record_code_validation("bad_request");
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateMeetingResponse::failed("Meeting code is required")),
        )
            .into_response();
    };

    let Some(room_api) = state.room_api.as_ref() else {
        metrics::record_code_validation("not_configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ValidateMeetingResponse::failed(
                "Media backend not configured",
            )),
        )
            .into_response();
    };

    match room_api.find_room(&code).await {
        Ok(Some(room)) => {
            metrics::record_code_validation("valid");
            // Malformed blobs decode to empty metadata; the room still
            // validates with the name/host fields omitted.
            let metadata = RoomMetadata::from_blob(&room.metadata);
            info!(
                target: "rs.handlers.meetings",
                meeting_code = %code,
                num_participants = room.num_participants,
                "Meeting code validated"
            );
            (StatusCode::OK, Json(ValidateMeetingResponse::found(metadata))).into_response()
        }
        Ok(None) => {
            metrics::record_code_validation("invalid");
            tracing::debug!(
                target: "rs.handlers.meetings",
                meeting_code = %code,
                "Meeting code has no live room"
            );
            (StatusCode::OK, Json(ValidateMeetingResponse::not_found())).into_response()
        }
        Err(RoomApiError::Internal(e)) => {
            metrics::record_code_validation("error");
            error!(target: "rs.handlers.meetings", error = %e, "Meeting validation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateMeetingResponse::failed("Failed to validate meeting")),
            )
                .into_response()
        }
        Err(e) => {
            // An unreachable backend must look exactly like a room that
            // does not exist; the real cause stays in the logs.
            metrics::record_code_validation("invalid");
            warn!(
                target: "rs.handlers.meetings",
                error = %e,
                "Room lookup failed, reporting code invalid"
            );
            (StatusCode::OK, Json(ValidateMeetingResponse::not_found())).into_response()
        }
    }
}

// ============================================================================
// Handler: PATCH /meeting
// ============================================================================

/// Handler for PATCH /meeting
///
/// Store `{meetingName, hostIdentity}` as room metadata on the media
/// backend. The caller authenticates with their own join token, which
/// must carry host authority (room admin grant) for the room named in
/// the body.
///
/// # Response
///
/// - 200 OK: `{ "success": true }`
/// - 400 Bad Request: unparseable body or invalid fields
/// - 401 Unauthorized: missing or unverifiable token (with `WWW-Authenticate`)
/// - 403 Forbidden: verified token without host authority for the room
/// - 404 Not Found: room does not exist on the backend
/// - 500 Internal Server Error: credentials not configured, or internal fault
/// - 503 Service Unavailable: backend unreachable
#[instrument(
    skip_all,
    name = "rs.meeting.update",
    fields(
        method = "PATCH",
        endpoint = "/meeting",
        status = tracing::field::Empty,
    )
)]
pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    // Token verification needs the credential pair, so the configuration
    // check has to come before authentication.
    let (Some(media), Some(room_api)) = (state.config.media.as_ref(), state.room_api.as_ref())
    else {
        metrics::record_metadata_update("not_configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ActionOutcome::failed("Media backend not configured")),
        )
            .into_response();
    };

    let claims = match require_room_token(&headers, media) {
        Ok(claims) => claims,
        Err(rejection) => {
            metrics::record_metadata_update("unauthorized");
            return rejection.into_response();
        }
    };

    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: UpdateMeetingRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(target: "rs.handlers.meetings", error = %e, "Invalid request body");
            metrics::record_metadata_update("bad_request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ActionOutcome::failed("Invalid request body")),
            )
                .into_response();
        }
    };

    if let Err(e) = request.validate() {
        metrics::record_metadata_update("bad_request");
        return (StatusCode::BAD_REQUEST, Json(ActionOutcome::failed(e))).into_response();
    }

    if !claims.authorizes_host(&request.room_name) {
        metrics::record_metadata_update("forbidden");
        warn!(
            target: "rs.handlers.meetings",
            room = %request.room_name,
            "Join token does not carry host authority for room"
        );
        return (
            StatusCode::FORBIDDEN,
            Json(ActionOutcome::failed("Host authorization required")),
        )
            .into_response();
    }

    let metadata = RoomMetadata {
        meeting_name: Some(request.meeting_name.trim().to_string()),
        host_identity: Some(request.host_identity.trim().to_string()),
    };

    let blob = match metadata.to_blob() {
        Ok(blob) => blob,
        Err(e) => {
            metrics::record_metadata_update("error");
            error!(target: "rs.handlers.meetings", error = %e, "Failed to encode room metadata");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionOutcome::failed("Failed to update meeting")),
            )
                .into_response();
        }
    };

    match room_api.update_room_metadata(&request.room_name, &blob).await {
        Ok(room) => {
            metrics::record_metadata_update("success");
            info!(
                target: "rs.handlers.meetings",
                room = %room.name,
                "Room metadata updated"
            );
            (StatusCode::OK, Json(ActionOutcome::ok())).into_response()
        }
        Err(RoomApiError::RoomNotFound) => {
            metrics::record_metadata_update("not_found");
            tracing::debug!(
                target: "rs.handlers.meetings",
                room = %request.room_name,
                "Metadata update targeted a room that does not exist"
            );
            (
                StatusCode::NOT_FOUND,
                Json(ActionOutcome::failed("Room not found")),
            )
                .into_response()
        }
        Err(RoomApiError::Unavailable(e)) => {
            metrics::record_metadata_update("unavailable");
            warn!(target: "rs.handlers.meetings", error = %e, "Metadata update failed, backend unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ActionOutcome::failed("Media backend unavailable")),
            )
                .into_response()
        }
        Err(e) => {
            metrics::record_metadata_update("error");
            error!(target: "rs.handlers.meetings", error = %e, "Metadata update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionOutcome::failed("Failed to update meeting")),
            )
                .into_response()
        }
    }
}
