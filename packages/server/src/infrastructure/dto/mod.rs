//! Data Transfer Objects (DTOs) for wire formats.
//!
//! This module contains serializable types for communication between
//! the server and its clients, and conversion logic from domain entities.

pub mod conversion;
pub mod http;
pub mod websocket;
