//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクト構築時の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("chat id must not be empty")]
    EmptyChatId,

    #[error("message content must not be empty")]
    EmptyMessageContent,

    #[error("message content is too long ({0} chars)")]
    MessageContentTooLong(usize),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
