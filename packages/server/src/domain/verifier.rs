//! Credential Verifier trait 定義

use thiserror::Error;

use super::value_object::UserId;

/// アクセストークン検証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("access token is malformed or has a bad signature")]
    Invalid,

    #[error("access token has expired")]
    Expired,
}

/// Token Verifier trait
///
/// ハンドシェイクで提示された bearer credential を検証し、埋め込まれた
/// ユーザー ID を返す。署名・有効期限の検証のみを担い、ユーザーの存在確認は
/// UseCase 層が Repository に対して行う。
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// "access" クラスのトークンとして検証し、subject のユーザー ID を返す
    fn verify_access(&self, token: &str) -> Result<UserId, TokenError>;
}
