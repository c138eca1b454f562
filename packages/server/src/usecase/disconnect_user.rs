//! UseCase: ユーザー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUserUseCase::execute() メソッド
//! - 接続所有権に基づく Registry エントリの削除と購読の解除
//!
//! ### なぜこのテストが必要か
//! - 再接続競合時に古い接続の切断が新しいセッションを壊さないことを保証
//! - offline 通知がユーザーごとに高々 1 回になる根拠（Removed の場合のみ通知）
//!
//! ### どのような状況を想定しているか
//! - 正常系：現役の接続の切断
//! - エッジケース：再接続後に古い接続が切断される（Superseded）
//! - エッジケース：同じ接続の二重切断

use std::sync::Arc;

use crate::domain::{ConnectionId, EventPusher, UserId};
use crate::infrastructure::session::SessionRegistry;

/// 切断処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// この接続が現役のセッションを所有しており、エントリを削除した。
    /// 呼び出し側は offline 通知を行ってよい。
    Removed,
    /// Registry のエントリは別の（より新しい）接続が所有しているため、
    /// 何も削除しなかった。offline 通知は行ってはならない。
    Superseded,
}

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    /// Session Registry（接続中ユーザーの台帳）
    registry: Arc<SessionRegistry>,
    /// EventPusher（イベント配送の抽象化）
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
    pub fn new(registry: Arc<SessionRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// ユーザー切断を実行
    ///
    /// Registry のエントリは、この接続が所有している場合のみ削除される。
    /// 再接続で上書きされた後に古い接続が閉じても、新しいセッションは影響を受けない。
    pub async fn execute(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> DisconnectOutcome {
        if !self.registry.unregister(user_id, connection_id).await {
            tracing::debug!(
                "Stale disconnect for user '{}' ignored (session superseded)",
                user_id.as_str()
            );
            return DisconnectOutcome::Superseded;
        }

        // ルームチャンネルの購読を全て解除
        self.pusher.unsubscribe_all(user_id).await;

        tracing::info!("User '{}' disconnected", user_id.as_str());
        DisconnectOutcome::Removed
    }

    /// ユーザーがオフラインになったことを残りの全接続にブロードキャスト
    pub async fn broadcast_offline(&self, user_id: &UserId, message: &str) {
        self.pusher.broadcast_except(user_id, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PusherChannel, Timestamp, UserProfile};
    use crate::infrastructure::event_pusher::WebSocketEventPusher;
    use tokio::sync::mpsc;

    fn profile(id: &str) -> UserProfile {
        UserProfile::new(
            UserId::new(id.to_string()).unwrap(),
            format!("{id}-name"),
            None,
        )
    }

    fn channel() -> PusherChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        std::mem::forget(rx);
        tx
    }

    fn build_usecase() -> (DisconnectUserUseCase, Arc<SessionRegistry>, Arc<WebSocketEventPusher>) {
        let registry = Arc::new(SessionRegistry::new());
        let pusher = Arc::new(WebSocketEventPusher::new(registry.clone()));
        let usecase = DisconnectUserUseCase::new(registry.clone(), pusher.clone());
        (usecase, registry, pusher)
    }

    #[tokio::test]
    async fn test_disconnect_active_connection_removes_entry() {
        // テスト項目: 現役の接続の切断でエントリが削除され、購読も解除される
        // given (前提条件):
        let (usecase, registry, pusher) = build_usecase();
        let alice = profile("alice");
        let connection_id = ConnectionId::generate();
        registry
            .register(alice.clone(), connection_id, channel(), Timestamp::new(1000))
            .await;
        let chat_id = crate::domain::ChatId::new("chat-1".to_string()).unwrap();
        pusher.subscribe(chat_id.clone(), alice.id.clone()).await;

        // when (操作):
        let outcome = usecase.execute(&alice.id, &connection_id).await;

        // then (期待する結果):
        assert_eq!(outcome, DisconnectOutcome::Removed);
        assert!(!registry.is_online(&alice.id).await);
        assert_eq!(pusher.subscriber_count(&chat_id).await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_superseded_connection_is_noop() {
        // テスト項目: 再接続後に古い接続が切断されても新しいセッションは残る
        // given (前提条件):
        let (usecase, registry, _pusher) = build_usecase();
        let alice = profile("alice");
        let old_connection = ConnectionId::generate();
        registry
            .register(alice.clone(), old_connection, channel(), Timestamp::new(1000))
            .await;
        let new_connection = ConnectionId::generate();
        registry
            .register(alice.clone(), new_connection, channel(), Timestamp::new(2000))
            .await;

        // when (操作): 古い接続の切断が後から届く
        let outcome = usecase.execute(&alice.id, &old_connection).await;

        // then (期待する結果):
        assert_eq!(outcome, DisconnectOutcome::Superseded);
        assert!(registry.is_online(&alice.id).await);
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_removed_then_superseded() {
        // テスト項目: 同じ接続の二重切断は 2 回目が Superseded になる
        // given (前提条件):
        let (usecase, registry, _pusher) = build_usecase();
        let alice = profile("alice");
        let connection_id = ConnectionId::generate();
        registry
            .register(alice.clone(), connection_id, channel(), Timestamp::new(1000))
            .await;

        // when (操作):
        let first = usecase.execute(&alice.id, &connection_id).await;
        let second = usecase.execute(&alice.id, &connection_id).await;

        // then (期待する結果): offline 通知の根拠になるのは 1 回目だけ
        assert_eq!(first, DisconnectOutcome::Removed);
        assert_eq!(second, DisconnectOutcome::Superseded);
    }
}
