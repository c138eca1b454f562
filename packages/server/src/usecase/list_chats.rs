//! UseCase: チャット一覧の取得

use std::sync::Arc;

use crate::domain::{ChatRepository, ChatSummary, RepositoryError, UserId};

/// チャット一覧取得のユースケース
///
/// 要求者が参加しているチャットのサマリを last_activity の降順で返す。
pub struct ListChatsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
}

impl ListChatsUseCase {
    /// 新しい ListChatsUseCase を作成
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// チャット一覧取得を実行
    pub async fn execute(&self, user_id: &UserId) -> Result<Vec<ChatSummary>, RepositoryError> {
        self.repository.list_chats_for_user(user_id).await
    }
}
