//! UseCase: メッセージ履歴の取得

use std::sync::Arc;

use crate::domain::{ChatId, ChatMessage, ChatRepository, UserId};

use super::error::ListMessagesError;

/// 1 ページあたりの件数の上限
const MAX_PAGE_LIMIT: usize = 100;
/// 1 ページあたりの件数の既定値
const DEFAULT_PAGE_LIMIT: usize = 50;

/// メッセージ履歴取得のユースケース
///
/// ページは新しい方から数える（page 1 = 最新）が、ページ内は時系列の昇順で返す。
/// 履歴は参加者のみが閲覧できる。
pub struct ListMessagesUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
}

impl ListMessagesUseCase {
    /// 新しい ListMessagesUseCase を作成
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// メッセージ履歴取得を実行
    ///
    /// page と limit は範囲外の値を拒否せず安全な値へクランプする。
    pub async fn execute(
        &self,
        user_id: &UserId,
        chat_id: &ChatId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ListMessagesError> {
        if !self.repository.is_participant(chat_id, user_id).await? {
            return Err(ListMessagesError::Unauthorized);
        }

        let page = page.max(1);
        let limit = if limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            limit.min(MAX_PAGE_LIMIT)
        };

        let messages = self.repository.list_messages(chat_id, page, limit).await?;
        Ok(messages)
    }
}
