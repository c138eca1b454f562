//! HTTP / WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{create_chat, health_check, list_chats, list_messages};
pub use websocket::websocket_handler;
