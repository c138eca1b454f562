//! UseCase: 明示的なルーム参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChatUseCase::execute() メソッド
//! - 参加者チェックとルームチャンネルの購読
//!
//! ### なぜこのテストが必要か
//! - 接続後に作成されたチャットへ再接続なしで合流できる経路の保証
//! - 非参加者が購読を獲得できないこと（認可）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者による join（購読の追加、冪等）
//! - 異常系：chatId 欠落 / 非参加者 / チャット不存在

use std::sync::Arc;

use crate::domain::{ChatId, ChatRepository, EventPusher, UserId};

use super::error::JoinChatError;

/// 明示的なルーム参加のユースケース
///
/// ハンドシェイク時の購読スナップショットに含まれないチャット（接続後に
/// 作成されたものなど）へ合流するための経路。購読は冪等で、既に購読済みの
/// チャットへの join も成功する。
pub struct JoinChatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
    /// EventPusher（イベント配送の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl JoinChatUseCase {
    /// 新しい JoinChatUseCase を作成
    pub fn new(repository: Arc<dyn ChatRepository>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { repository, pusher }
    }

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatId)` - 購読に成功したチャット ID（ack イベントの生成に使う）
    /// * `Err(JoinChatError)` - 検証・認可の失敗（購読は追加されない）
    pub async fn execute(
        &self,
        user_id: &UserId,
        raw_chat_id: Option<String>,
    ) -> Result<ChatId, JoinChatError> {
        let chat_id = raw_chat_id
            .and_then(|raw| ChatId::new(raw).ok())
            .ok_or(JoinChatError::MissingChatId)?;

        if !self.repository.is_participant(&chat_id, user_id).await? {
            return Err(JoinChatError::Unauthorized);
        }

        self.pusher
            .subscribe(chat_id.clone(), user_id.clone())
            .await;

        tracing::debug!(
            "User '{}' joined chat room '{}'",
            user_id.as_str(),
            chat_id.as_str()
        );
        Ok(chat_id)
    }
}
