//! Service layer for the room service.
//!
//! This module contains clients that interact with external systems.
//!
//! # Components
//!
//! - `room_api` - HTTP client for the media backend room API

pub mod room_api;

pub use room_api::{RoomApi, RoomApiClient, RoomApiError, RoomInfo};
