//! UseCase: 接続ハンドシェイクの認証
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthenticateConnectionUseCase::execute() メソッド
//! - bearer credential の検証とユーザー存在確認
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続が Connection を獲得しないことはこのシステムの
//!   最重要の不変条件（Fan-out への参加は認証成功が前提）
//! - 構造的に正しいトークンでも、削除済みユーザーには接続させない
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークン + 実在するユーザー
//! - 異常系：トークン欠落 / 期限切れ / 不正署名 / ユーザー不存在 / ストレージ障害

use std::sync::Arc;

use crate::domain::{ChatRepository, TokenVerifier, UserProfile};

use super::error::AuthenticateError;

/// 接続認証のユースケース
///
/// トークンの検証に成功しても、二次的な永続化層の照会でユーザーの存在を
/// 確認するまで接続は認められない。いずれの失敗もハンドシェイクを中断させる。
pub struct AuthenticateConnectionUseCase {
    /// TokenVerifier（credential 検証の抽象化）
    verifier: Arc<dyn TokenVerifier>,
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
}

impl AuthenticateConnectionUseCase {
    /// 新しい AuthenticateConnectionUseCase を作成
    pub fn new(verifier: Arc<dyn TokenVerifier>, repository: Arc<dyn ChatRepository>) -> Self {
        Self {
            verifier,
            repository,
        }
    }

    /// 接続認証を実行
    ///
    /// # Arguments
    ///
    /// * `token` - ハンドシェイクの明示的フィールド、または Cookie から
    ///   取り出した bearer credential（どちらにも無い場合は None）
    ///
    /// # Returns
    ///
    /// * `Ok(UserProfile)` - 認証成功（Principal の公開プロフィールスナップショット）
    /// * `Err(AuthenticateError)` - 認証失敗（接続は確立してはならない）
    pub async fn execute(&self, token: Option<&str>) -> Result<UserProfile, AuthenticateError> {
        let token = token.ok_or(AuthenticateError::TokenMissing)?;

        // 1. 署名と有効期限を "access" クラスとして検証
        let user_id = self.verifier.verify_access(token)?;

        // 2. ユーザーがまだ存在するか永続化層で確認
        let user = self
            .repository
            .find_user(&user_id)
            .await?
            .ok_or_else(|| AuthenticateError::UserNotFound(user_id.as_str().to_string()))?;

        Ok(user)
    }
}
