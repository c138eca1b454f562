//! Session Registry
//!
//! 接続中ユーザーのプロセスローカルな台帳。ユーザー ID をキーに、
//! 最新の接続ハンドル・プロフィールスナップショット・最終確認時刻を保持します。
//!
//! ## 設計ノート
//!
//! - モジュールレベルのシングルトンではなく、サーバー起動時に生成して
//!   注入するライフサイクルスコープのオブジェクト。テストでは独立した
//!   インスタンスを生成できる。
//! - 再接続は黙ってエントリを上書きする（last-writer-wins）。マルチデバイス
//!   同時接続のプレゼンスはスコープ外。
//! - 削除は接続 ID の一致を要求する。上書きされた古い接続の後始末が、
//!   新しい接続のエントリを誤って消さないようにするため。
//! - 永続化しない。プロセス再起動後は全ユーザーがオフライン扱いとなり、
//!   再接続によって台帳が再構築される。

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, PusherChannel, Timestamp, UserId, UserProfile};

/// Session Registry のエントリ
///
/// 1 ユーザーにつき最新の接続 1 本分の情報を保持する。
pub struct SessionEntry {
    pub connection_id: ConnectionId,
    pub user: UserProfile,
    pub sender: PusherChannel,
    pub last_seen: Timestamp,
}

/// 接続中ユーザーの台帳
pub struct SessionRegistry {
    entries: Mutex<HashMap<UserId, SessionEntry>>,
}

impl SessionRegistry {
    /// 新しい空の SessionRegistry を作成
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// エントリを登録する
    ///
    /// 同一ユーザーのエントリが既に存在する場合は黙って上書きする
    /// （再接続のエラーにはしない）。
    pub async fn register(
        &self,
        user: UserProfile,
        connection_id: ConnectionId,
        sender: PusherChannel,
        last_seen: Timestamp,
    ) {
        let mut entries = self.entries.lock().await;
        let user_id = user.id.clone();
        let superseded = entries
            .insert(
                user_id.clone(),
                SessionEntry {
                    connection_id,
                    user,
                    sender,
                    last_seen,
                },
            )
            .is_some();
        if superseded {
            tracing::debug!(
                "Session for user '{}' superseded by a newer connection",
                user_id.as_str()
            );
        }
    }

    /// エントリを削除する
    ///
    /// `connection_id` が現在のエントリの所有者と一致する場合のみ削除し、
    /// 削除が行われたかどうかを返す。呼び出し側はこの戻り値で
    /// オフライン通知を一度だけ行う。
    pub async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(user_id) {
            Some(entry) if entry.connection_id == *connection_id => {
                entries.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// ユーザーの個人チャンネル（接続ハンドル）を取得
    pub async fn lookup_sender(&self, user_id: &UserId) -> Option<PusherChannel> {
        let entries = self.entries.lock().await;
        entries.get(user_id).map(|entry| entry.sender.clone())
    }

    /// ユーザーが接続中かどうか
    pub async fn is_online(&self, user_id: &UserId) -> bool {
        let entries = self.entries.lock().await;
        entries.contains_key(user_id)
    }

    /// 接続中ユーザー数
    pub async fn count(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.len()
    }

    /// 接続中ユーザーのプロフィール一覧（指定ユーザーを除く、ID 順）
    pub async fn online_users_except(&self, exclude: &UserId) -> Vec<UserProfile> {
        let entries = self.entries.lock().await;
        let mut users: Vec<UserProfile> = entries
            .values()
            .filter(|entry| entry.user.id != *exclude)
            .map(|entry| entry.user.clone())
            .collect();
        users.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        users
    }

    /// 指定ユーザーを除く全ての接続ハンドルを取得
    pub async fn senders_except(&self, exclude: &UserId) -> Vec<(UserId, PusherChannel)> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|(user_id, _)| *user_id != exclude)
            .map(|(user_id, entry)| (user_id.clone(), entry.sender.clone()))
            .collect()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
