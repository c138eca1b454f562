//! ドメイン層
//!
//! 値オブジェクト・エンティティと、Infrastructure 層が実装するインターフェース
//! （Repository / EventPusher / TokenVerifier）を定義します（依存性の逆転）。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;
pub mod verifier;

pub use entity::{Chat, ChatMessage, ChatSummary, UserProfile};
pub use error::{DomainError, RepositoryError};
pub use pusher::{EventPushError, EventPusher, PusherChannel};
pub use repository::ChatRepository;
pub use value_object::{ChatId, ConnectionId, MessageContent, Timestamp, UserId};
pub use verifier::{TokenError, TokenVerifier};
