//! Call session error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced across the session handle boundary.
///
/// Most in-call failures (chat delivery, bitrate pushes, device
/// switches) are logged inside the actor and never reach the caller.
/// What remains is the actor lifecycle itself.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The actor mailbox or a reply channel closed, which means the
    /// session task has stopped.
    #[error("session channel error: {0}")]
    Channel(String),

    /// The media backend refused or could not perform an operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
