//! Common utilities and types shared across Huddle components.

#![warn(clippy::pedantic)]

/// Module for meeting code generation and parsing
pub mod code;

/// Module for room and participant metadata payloads
pub mod metadata;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for room access tokens (minting, verification, grants)
pub mod token;
