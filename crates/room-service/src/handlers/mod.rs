//! HTTP request handlers for the room service.

pub mod health;
pub mod meetings;
pub mod metrics;
pub mod tokens;

pub use health::{health_check, readiness_check};
pub use meetings::{create_meeting, update_meeting, validate_meeting};
pub use metrics::metrics_handler;
pub use tokens::issue_token;
