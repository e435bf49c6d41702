//! Bearer join-token verification for host-only routes.
//!
//! `PATCH /meeting` is the only authenticated route, and its envelope is
//! endpoint-specific, so verification runs inside the handler rather
//! than as a router layer: extract the Bearer token from the
//! Authorization header, verify it against the configured media backend
//! credentials, and hand the claims back for the host-authority check.
//!
//! # Security
//!
//! - Every failure mode (missing header, malformed header, unverifiable
//!   token) renders the same generic 401 envelope; the specific cause is
//!   logged at debug level only
//! - 401 responses carry a `WWW-Authenticate` challenge
//! - Host authority (room admin grant on the right room) is checked by
//!   the handler after verification, yielding 403 instead

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::token::{self, RoomAccessClaims};

use crate::config::MediaBackendConfig;
use crate::models::ActionOutcome;

/// Value of the `WWW-Authenticate` header attached to 401 responses.
pub const WWW_AUTHENTICATE: &str = "Bearer realm=\"huddle-api\", error=\"invalid_token\"";

/// Rejection for requests that fail Bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ActionOutcome::failed("Authentication required")),
        )
            .into_response();

        // Add WWW-Authenticate header for 401 responses
        if let Ok(header_value) = WWW_AUTHENTICATE.parse() {
            response
                .headers_mut()
                .insert("WWW-Authenticate", header_value);
        }

        response
    }
}

/// Extract Bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "rs.middleware.auth", "Missing Authorization header");
            AuthRejection
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "rs.middleware.auth", "Invalid Authorization header format");
        AuthRejection
    })
}

/// Verify the Bearer join token on a request.
///
/// Returns the verified claims for the handler's host-authority check.
///
/// # Errors
///
/// Returns [`AuthRejection`] (rendering the 401 contract) if the header
/// is missing or malformed, or if the token fails verification.
pub fn require_room_token(
    headers: &HeaderMap,
    media: &MediaBackendConfig,
) -> Result<RoomAccessClaims, AuthRejection> {
    let bearer = extract_bearer_token(headers)?;

    token::verify(bearer, &media.api_key, &media.api_secret).map_err(|e| {
        tracing::debug!(target: "rs.middleware.auth", error = %e, "Join token verification failed");
        AuthRejection
    })
}
