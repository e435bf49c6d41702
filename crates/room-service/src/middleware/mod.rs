//! Middleware for the room service.
//!
//! This module contains HTTP middleware layers and the handler-level
//! authentication helpers.
//!
//! # Components
//!
//! - `auth` - Bearer join-token verification for host-only routes
//! - `http_metrics` - HTTP request metrics middleware

pub mod auth;
pub mod http_metrics;

pub use auth::{require_room_token, AuthRejection, WWW_AUTHENTICATE};
pub use http_metrics::http_metrics_middleware;
