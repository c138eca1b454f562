//! UseCase: ダイレクトチャットの作成

use std::sync::Arc;

use tsumugi_shared::time::Clock;

use crate::domain::{Chat, ChatRepository, Timestamp, UserId};

use super::error::CreateChatError;

/// ダイレクトチャット作成のユースケース
///
/// 2 人のユーザー間のチャットは高々 1 つ。既存のチャットがあればそれを返し、
/// 無ければ新しく作成する。
pub struct CreateChatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
    /// Clock（時刻取得の抽象化）
    clock: Arc<dyn Clock>,
}

impl CreateChatUseCase {
    /// 新しい CreateChatUseCase を作成
    pub fn new(repository: Arc<dyn ChatRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// ダイレクトチャット作成を実行
    pub async fn execute(
        &self,
        requester_id: &UserId,
        raw_other_user_id: &str,
    ) -> Result<Chat, CreateChatError> {
        let other_user_id = UserId::new(raw_other_user_id.to_string())
            .map_err(|_| CreateChatError::OtherUserMissing)?;
        if other_user_id == *requester_id {
            return Err(CreateChatError::SelfChat);
        }
        if self.repository.find_user(&other_user_id).await?.is_none() {
            return Err(CreateChatError::OtherUserNotFound(
                other_user_id.into_string(),
            ));
        }

        let now = Timestamp::new(self.clock.now_utc_millis());
        let chat = self
            .repository
            .create_or_find_direct_chat(requester_id, &other_user_id, now)
            .await?;
        Ok(chat)
    }
}
