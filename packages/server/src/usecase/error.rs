//! UseCase 層のエラー定義
//!
//! エラーの扱いはスコープごとに異なる：
//! - 認証エラーはハンドシェイクに対して致命的（接続は確立されない）
//! - 認可・検証エラーは非致命的で、当該接続への error イベントになる
//! - 永続化エラーは操作ごとのポリシーに従う（§ 各 UseCase のドキュメント）

use thiserror::Error;

use crate::domain::{DomainError, RepositoryError, TokenError};

/// 接続ハンドシェイクの認証エラー（致命的）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    #[error("access token missing")]
    TokenMissing,

    #[error("access token rejected: {0}")]
    TokenRejected(#[from] TokenError),

    #[error("user '{0}' no longer exists")]
    UserNotFound(String),

    #[error("failed to verify user: {0}")]
    Repository(#[from] RepositoryError),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// chatId 欠落、またはトリム後に空になる本文
    #[error("Chat ID and content are required")]
    MissingFields,

    /// 長すぎる本文など、本文の検証エラー
    #[error("invalid message content: {0}")]
    ContentRejected(DomainError),

    /// チャットが存在しない、または送信者が参加者でない
    #[error("Invalid chat or unauthorized access")]
    Unauthorized,

    #[error("failed to persist message: {0}")]
    Repository(#[from] RepositoryError),
}

/// 明示的なルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinChatError {
    #[error("Chat ID is required")]
    MissingChatId,

    #[error("Unauthorized access to chat")]
    Unauthorized,

    #[error("failed to verify chat membership: {0}")]
    Repository(#[from] RepositoryError),
}

/// ダイレクトチャット作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateChatError {
    #[error("other user id is required")]
    OtherUserMissing,

    #[error("other user '{0}' not found")]
    OtherUserNotFound(String),

    #[error("cannot create chat with yourself")]
    SelfChat,

    #[error("failed to create chat: {0}")]
    Repository(#[from] RepositoryError),
}

/// メッセージ履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListMessagesError {
    /// チャットが存在しない、または要求者が参加者でない
    #[error("Unauthorized access to chat")]
    Unauthorized,

    #[error("failed to load messages: {0}")]
    Repository(#[from] RepositoryError),
}
