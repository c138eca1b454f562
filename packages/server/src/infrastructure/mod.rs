//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体的な実装と、
//! ワイヤーフォーマット（DTO）を提供します。

pub mod auth;
pub mod dto;
pub mod event_pusher;
pub mod repository;
pub mod session;
