//! EventPusher 実装

mod websocket;

pub use websocket::WebSocketEventPusher;
