//! Real-time chat backend library.
//!
//! This library provides the server implementation for a social-networking
//! chat backend: a JWT-gated WebSocket endpoint for real-time messaging,
//! presence and typing indicators, and an HTTP API for chat and message
//! history access.

// layers
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
