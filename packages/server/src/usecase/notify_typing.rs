//! UseCase: タイピング通知の中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NotifyTypingUseCase::relay() メソッド
//! - ルームチャンネルへの中継と送信者自身の除外
//!
//! ### なぜこのテストが必要か
//! - 送信者自身の typing インジケータが自分に返らないことの保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：他の購読者への中継
//! - エッジケース：送信者のみが購読しているルーム（中継先なし）

use std::sync::Arc;

use crate::domain::{ChatId, EventPusher, UserId};

/// タイピング通知中継のユースケース
///
/// 通知は純粋に一時的なシグナルで、永続化も参加者チェックも行わない。
/// ルームチャンネルを購読していない相手には届かない（購読が実質の認可になる）。
/// 停止の自動タイムアウトは持たず、停止通知はクライアントの責務。
pub struct NotifyTypingUseCase {
    /// EventPusher（イベント配送の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl NotifyTypingUseCase {
    /// 新しい NotifyTypingUseCase を作成
    pub fn new(pusher: Arc<dyn EventPusher>) -> Self {
        Self { pusher }
    }

    /// タイピング通知をルームチャンネルへ中継（送信者を除く）
    pub async fn relay(&self, chat_id: &ChatId, sender_id: &UserId, message: &str) {
        self.pusher.to_chat(chat_id, message, Some(sender_id)).await;
    }
}
