//! Call Session Library
//!
//! Headless in-call core for a Huddle meeting client. The UI shell
//! renders; this crate owns the decisions:
//!
//! - Roster and chat state behind a single session actor
//! - Participant-count bitrate policy for the outgoing video encoder
//! - Best-effort room metadata publication by the host
//! - Pre-join device acquisition and permission classification
//! - Injected application settings (accent color)
//!
//! # Architecture
//!
//! All in-call state lives in one tokio task:
//!
//! ```text
//! SessionHandle -> mpsc commands -> SessionActor <- backend event stream
//!                                        |
//!                                MediaBackend seam (chat, bitrate, devices)
//! ```
//!
//! The media backend itself (SFU connection, track transport) sits
//! behind the [`backend::MediaBackend`] trait; this crate never talks
//! to the network directly. The shell wires a concrete backend and a
//! [`metadata_writer::MeetingApi`] implementation at startup.
//!
//! # Modules
//!
//! - `actors` - Session actor, mailbox messages, handle
//! - `backend` - Media backend trait seam
//! - `bitrate` - Participant-count encoder bitrate policy
//! - `chat` - Chat envelope codec and ordered message log
//! - `devices` - Device kinds, access-error classification, preview guard
//! - `errors` - Session-level error type
//! - `events` - Backend event stream types
//! - `metadata_writer` - One-shot room metadata publication with retries
//! - `observability` - Metric names and recording helpers
//! - `prejoin` - Pre-join preview and join intent handoff
//! - `roster` - Participant model and roster bookkeeping
//! - `settings` - Application settings with injected storage

pub mod actors;
pub mod backend;
pub mod bitrate;
pub mod chat;
pub mod devices;
pub mod errors;
pub mod events;
pub mod metadata_writer;
pub mod observability;
pub mod prejoin;
pub mod roster;
pub mod settings;
