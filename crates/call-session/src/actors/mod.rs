//! Actor model for the in-call session.
//!
//! One actor per connected call owns all mutable call state:
//!
//! ```text
//! SessionHandle (cloneable, held by the shell)
//!   │ commands via tokio::sync::mpsc
//!   ▼
//! SessionActor (single task per call)
//!   ├── owns roster, chat log, bitrate controller, metadata writer
//!   ◄── backend events via tokio::sync::mpsc
//!   └── talks to the media backend through the MediaBackend seam
//! ```
//!
//! # Key Design Decisions
//!
//! - **Single writer**: roster and chat are mutated only inside the actor,
//!   so no locks and no torn snapshots
//! - **CancellationToken shutdown**: cancelling the handle disconnects the
//!   backend, which releases devices and listeners
//! - **Message passing**: all communication via `tokio::sync::mpsc` with
//!   `oneshot` replies where the caller needs an answer
//!
//! # Modules
//!
//! - [`messages`] - Command and snapshot types for the session actor
//! - [`session`] - `SessionActor` and its handle

pub mod messages;
pub mod session;

// Re-export primary types
pub use messages::{SessionCommand, SessionConfig, SessionSnapshot};
pub use session::{SessionActor, SessionHandle};
