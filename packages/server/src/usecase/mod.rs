//! UseCase 層
//!
//! リアルタイムチャットと HTTP API のアプリケーションロジック。
//! 各 UseCase は Repository / EventPusher / TokenVerifier の trait にのみ依存します。

mod authenticate_connection;
mod connect_user;
mod create_chat;
mod disconnect_user;
pub mod error;
mod join_chat;
mod list_chats;
mod list_messages;
mod notify_typing;
mod send_message;

pub use authenticate_connection::AuthenticateConnectionUseCase;
pub use connect_user::{ConnectUserUseCase, ConnectedSession};
pub use create_chat::CreateChatUseCase;
pub use disconnect_user::{DisconnectOutcome, DisconnectUserUseCase};
pub use error::{
    AuthenticateError, CreateChatError, JoinChatError, ListMessagesError, SendMessageError,
};
pub use join_chat::JoinChatUseCase;
pub use list_chats::ListChatsUseCase;
pub use list_messages::ListMessagesUseCase;
pub use notify_typing::NotifyTypingUseCase;
pub use send_message::{SendMessageInput, SendMessageUseCase};
