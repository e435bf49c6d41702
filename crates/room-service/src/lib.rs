//! Room Service Library
//!
//! This library provides the core functionality for the Huddle room
//! service - a stateless HTTP API responsible for:
//!
//! - Meeting code generation (create, validate)
//! - Room metadata updates (host authenticated)
//! - Join token issuance for the media backend
//!
//! # Architecture
//!
//! The service follows the Handler -> Service pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/room_api.rs -> media backend
//! ```
//!
//! There is no database; meeting state lives entirely on the media
//! backend as room metadata, and codes are unguessable rather than
//! registered.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer token verification and HTTP metrics
//! - `models` - Request/response models
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup
//! - `services` - Media backend room API client

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
