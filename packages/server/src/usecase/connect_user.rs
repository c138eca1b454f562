//! UseCase: 認証済みユーザーの接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::execute() メソッド
//! - Session Registry への登録とルームチャンネルの購読
//!
//! ### なぜこのテストが必要か
//! - ハンドシェイク成功後の接続が Registry にちょうど 1 回登録されることを保証
//! - ルームメンバーシップのロード失敗時に接続を切らず空購読で継続する
//!   ポリシー（可用性優先）を固定する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加チャットの購読付き接続
//! - 異常系：メンバーシップのストレージ障害（空購読へのフォールバック）
//! - エッジケース：再接続による黙示的な上書き

use std::sync::Arc;

use tsumugi_shared::time::Clock;

use crate::domain::{
    ChatRepository, ConnectionId, EventPusher, PusherChannel, Timestamp, UserId, UserProfile,
};
use crate::infrastructure::session::SessionRegistry;

/// 接続処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedSession {
    /// この接続を識別する ID（切断時の所有者判定に使用）
    pub connection_id: ConnectionId,
    /// ハンドシェイク時に購読したルーム数
    pub subscribed_chats: usize,
}

/// ユーザー接続のユースケース
///
/// Registry への登録が個人チャンネルの購読を兼ねる（個人チャンネルの実体は
/// Registry が保持する接続ハンドル）。ルームチャンネルの購読リストは
/// ハンドシェイク時のスナップショットであり、セッション中のメンバーシップ
/// 変更では更新されない（既知の制限。配送時の認可は送信ごとに再照会される）。
pub struct ConnectUserUseCase {
    /// Session Registry（接続中ユーザーの台帳）
    registry: Arc<SessionRegistry>,
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ChatRepository>,
    /// EventPusher（イベント配送の抽象化）
    pusher: Arc<dyn EventPusher>,
    /// Clock（時刻取得の抽象化）
    clock: Arc<dyn Clock>,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(
        registry: Arc<SessionRegistry>,
        repository: Arc<dyn ChatRepository>,
        pusher: Arc<dyn EventPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            repository,
            pusher,
            clock,
        }
    }

    /// ユーザー接続を実行
    ///
    /// # Arguments
    ///
    /// * `user` - 認証済み Principal のプロフィールスナップショット
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 接続 ID と購読ルーム数。登録は失敗しない（再接続は黙って上書きされる）。
    pub async fn execute(&self, user: UserProfile, sender: PusherChannel) -> ConnectedSession {
        let connection_id = ConnectionId::generate();
        let user_id = user.id.clone();
        let now = Timestamp::new(self.clock.now_utc_millis());

        // 1. Session Registry に登録（個人チャンネルの購読を兼ねる）
        self.registry
            .register(user, connection_id, sender, now)
            .await;

        // 2. 参加している全てのルームチャンネルを購読
        //    ストレージ障害時は接続を切らず、空購読で続行する（可用性優先）
        let chat_ids = match self.repository.chat_ids_for_user(&user_id).await {
            Ok(chat_ids) => chat_ids,
            Err(e) => {
                tracing::warn!(
                    "Failed to load chat memberships for user '{}', proceeding with no \
                     room subscriptions: {}",
                    user_id.as_str(),
                    e
                );
                Vec::new()
            }
        };
        let subscribed_chats = chat_ids.len();
        for chat_id in chat_ids {
            self.pusher.subscribe(chat_id, user_id.clone()).await;
        }

        tracing::info!(
            "User '{}' connected and subscribed to {} chat room(s)",
            user_id.as_str(),
            subscribed_chats
        );

        ConnectedSession {
            connection_id,
            subscribed_chats,
        }
    }

    /// 現在オンラインのユーザー一覧を取得（自分を除く、ID 順）
    pub async fn online_users_except(&self, exclude: &UserId) -> Vec<UserProfile> {
        self.registry.online_users_except(exclude).await
    }

    /// ユーザーがオンラインになったことを他の全接続にブロードキャスト
    pub async fn broadcast_online(&self, user_id: &UserId, message: &str) {
        self.pusher.broadcast_except(user_id, message).await;
    }
}
