//! EventPusher trait 定義
//!
//! 「ユーザー宛」と「チャットルーム宛」の 2 つの宛先指定を持つ
//! ブロードキャスターのインターフェース。配送は at-most-once であり、
//! 接続していない宛先へのイベントは破棄されます（fire-and-forget）。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::value_object::{ChatId, UserId};

/// クライアントへのメッセージ送信用チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// イベント送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventPushError {
    #[error("user '{0}' is not connected")]
    UserOffline(String),

    #[error("failed to push event: {0}")]
    ChannelClosed(String),
}

/// Event Pusher trait
///
/// 永続接続の多重化トランスポートを抽象化する。個人チャンネルは
/// SessionRegistry のエントリ（ユーザー ID 単位）で、ルームチャンネルは
/// 購読集合で実現される。
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// 接続をチャットルームのチャンネルに購読登録する
    async fn subscribe(&self, chat_id: ChatId, user_id: UserId);

    /// ユーザーの全てのルーム購読を解除する
    async fn unsubscribe_all(&self, user_id: &UserId);

    /// ユーザーの個人チャンネルにイベントを送信する
    async fn to_user(&self, user_id: &UserId, content: &str) -> Result<(), EventPushError>;

    /// チャットルームチャンネルの購読者にイベントを送信する
    ///
    /// `exclude` に指定したユーザーには送信しない。接続していない購読者は
    /// 警告ログの上でスキップされる。
    async fn to_chat(&self, chat_id: &ChatId, content: &str, exclude: Option<&UserId>);

    /// 指定ユーザーを除く全ての接続中ユーザーにイベントを送信する
    async fn broadcast_except(&self, exclude: &UserId, content: &str);
}
