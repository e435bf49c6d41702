//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use them
//! for all sensitive values: the media backend API secret, signing
//! material, and bearer tokens held in memory.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` while holding one gets safe logging behavior for
//! free; `{:?}` and tracing cannot leak the value. Secrets are also
//! zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct BackendCredentials {
//!     api_key: String,
//!     api_secret: SecretString,  // Safe: Debug shows "[REDACTED]"
//! }
//!
//! let creds = BackendCredentials {
//!     api_key: "hdl_api_key_01".to_string(),
//!     api_secret: SecretString::from("hunter2"),
//! };
//!
//! // Redacted in Debug output
//! println!("{creds:?}");
//!
//! // Access requires an explicit expose_secret() call
//! let secret: &str = creds.api_secret.expose_secret();
//! # assert_eq!(secret, "hunter2");
//! ```
//!
//! # Huddle Usage Guidelines
//!
//! Use `SecretString` for:
//! - The media backend API secret
//! - Minted join credentials held by services
//! - Any value that would grant room access if logged

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
