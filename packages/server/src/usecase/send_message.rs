//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - フィールド検証、参加者チェック、永続化、配送対象の選定
//!
//! ### なぜこのテストが必要か
//! - 非参加者のメッセージがチャットに書き込まれないこと（認可）
//! - 永続化の失敗時にメッセージが配送されないこと（persist-then-deliver）
//! - 送信者自身も配送対象に含まれること（送達確認を兼ねる）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者によるメッセージ送信と全参加者への配送
//! - 異常系：フィールド欠落 / 空本文 / 長すぎる本文 / 非参加者 / ストレージ障害
//! - エッジケース：オフライン参加者への配送スキップ

use std::sync::Arc;

use tsumugi_shared::time::Clock;

use crate::domain::{
    ChatId, ChatMessage, ChatRepository, EventPusher, MessageContent, Timestamp, UserId,
};

use super::error::SendMessageError;

/// メッセージ送信の入力
///
/// クライアント入力はどのフィールドも欠落しうるため、検証前は全て Option。
#[derive(Debug, Clone, Default)]
pub struct SendMessageInput {
    pub chat_id: Option<String>,
    pub content: Option<String>,
}

/// メッセージ送信のユースケース
///
/// 認可（参加者チェック）と配送対象はハンドシェイク時のスナップショットではなく
/// 送信ごとに永続化層へ再照会する。永続化が成功するまで配送は行わない。
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
    /// EventPusher（イベント配送の抽象化）
    pusher: Arc<dyn EventPusher>,
    /// Clock（時刻取得の抽象化）
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        pusher: Arc<dyn EventPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者のユーザー ID（ハンドシェイクで認証済みの Principal）
    /// * `input` - クライアントから受信した未検証の入力
    ///
    /// # Returns
    ///
    /// * `Ok((ChatMessage, Vec<UserId>))` - 永続化されたメッセージと、
    ///   送信時点の参加者リスト（送信者を含む配送対象）
    /// * `Err(SendMessageError)` - 検証・認可・永続化の失敗（配送は行われない）
    pub async fn execute(
        &self,
        sender_id: &UserId,
        input: SendMessageInput,
    ) -> Result<(ChatMessage, Vec<UserId>), SendMessageError> {
        // 1. フィールド検証（欠落と空本文は同一のエラーメッセージに畳む）
        let chat_id = input
            .chat_id
            .and_then(|raw| ChatId::new(raw).ok())
            .ok_or(SendMessageError::MissingFields)?;
        let content = match input.content {
            None => return Err(SendMessageError::MissingFields),
            Some(raw) => MessageContent::new(raw).map_err(|e| match e {
                crate::domain::DomainError::EmptyMessageContent => SendMessageError::MissingFields,
                other => SendMessageError::ContentRejected(other),
            })?,
        };

        // 2. 認可：送信者がチャットの参加者であることを送信時点で確認
        //    チャット不存在と非参加者は区別せず同一エラーにする（情報漏洩の抑止）
        if !self.repository.is_participant(&chat_id, sender_id).await? {
            return Err(SendMessageError::Unauthorized);
        }

        // 3. 永続化（メッセージ追加と last_activity の更新は単一トランザクション）
        let now = Timestamp::new(self.clock.now_utc_millis());
        let message = self
            .repository
            .create_message(&chat_id, sender_id, content, now)
            .await?;

        // 4. 配送対象は送信時点の参加者（送信者を含む。送達確認を兼ねる）
        let participants = self.repository.participants_of(&chat_id).await?;

        Ok((message, participants))
    }

    /// 永続化済みメッセージを配送する
    ///
    /// 各参加者の個人チャンネルへ送った後、ルームチャンネルへ送る。
    /// オフライン参加者へのプッシュ失敗は配送全体を失敗させない。
    pub async fn deliver(
        &self,
        chat_id: &ChatId,
        participants: &[UserId],
        personal_json: &str,
        room_json: &str,
    ) {
        for participant in participants {
            if let Err(e) = self.pusher.to_user(participant, personal_json).await {
                tracing::debug!(
                    "Skipped personal delivery to '{}': {}",
                    participant.as_str(),
                    e
                );
            }
        }
        self.pusher.to_chat(chat_id, room_json, None).await;
    }
}
