//! WebSocket を使った EventPusher 実装
//!
//! ## 責務
//!
//! - チャットルームごとの購読集合の管理
//! - 個人チャンネル（SessionRegistry のエントリ）とルームチャンネルへの配送
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! 個人チャンネルの実体は SessionRegistry が保持する `UnboundedSender` であり、
//! この実装はユーザー ID を宛先とした間接参照で送信します。接続ハンドルを
//! 直接持たないため、登録の上書き（再接続）後も常に最新の接続へ届きます。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatId, EventPushError, EventPusher, UserId};
use crate::infrastructure::session::SessionRegistry;

/// WebSocket を使った EventPusher 実装
pub struct WebSocketEventPusher {
    /// 個人チャンネルの宛先解決に使う Session Registry
    registry: Arc<SessionRegistry>,
    /// チャットルームごとの購読ユーザー集合
    ///
    /// Key: ChatId / Value: 購読中のユーザー ID 集合
    chat_channels: Mutex<HashMap<ChatId, HashSet<UserId>>>,
}

impl WebSocketEventPusher {
    /// 新しい WebSocketEventPusher を作成
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            chat_channels: Mutex::new(HashMap::new()),
        }
    }

    /// チャットルームの現在の購読者数（テスト・デバッグ用）
    pub async fn subscriber_count(&self, chat_id: &ChatId) -> usize {
        let channels = self.chat_channels.lock().await;
        channels.get(chat_id).map(|set| set.len()).unwrap_or(0)
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn subscribe(&self, chat_id: ChatId, user_id: UserId) {
        let mut channels = self.chat_channels.lock().await;
        let subscribers = channels.entry(chat_id.clone()).or_default();
        subscribers.insert(user_id.clone());
        tracing::debug!(
            "User '{}' subscribed to chat channel '{}'",
            user_id.as_str(),
            chat_id.as_str()
        );
    }

    async fn unsubscribe_all(&self, user_id: &UserId) {
        let mut channels = self.chat_channels.lock().await;
        channels.retain(|_, subscribers| {
            subscribers.remove(user_id);
            !subscribers.is_empty()
        });
        tracing::debug!(
            "User '{}' unsubscribed from all chat channels",
            user_id.as_str()
        );
    }

    async fn to_user(&self, user_id: &UserId, content: &str) -> Result<(), EventPushError> {
        match self.registry.lookup_sender(user_id).await {
            Some(sender) => {
                sender
                    .send(content.to_string())
                    .map_err(|e| EventPushError::ChannelClosed(e.to_string()))?;
                tracing::debug!("Pushed event to user '{}'", user_id.as_str());
                Ok(())
            }
            None => Err(EventPushError::UserOffline(user_id.as_str().to_string())),
        }
    }

    async fn to_chat(&self, chat_id: &ChatId, content: &str, exclude: Option<&UserId>) {
        let subscribers: Vec<UserId> = {
            let channels = self.chat_channels.lock().await;
            match channels.get(chat_id) {
                Some(subscribers) => subscribers
                    .iter()
                    .filter(|user_id| exclude != Some(*user_id))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };

        for user_id in subscribers {
            // ルームチャンネルへの配送は一部の送信失敗を許容
            if let Err(e) = self.to_user(&user_id, content).await {
                tracing::warn!(
                    "Skipped chat '{}' subscriber '{}': {}",
                    chat_id.as_str(),
                    user_id.as_str(),
                    e
                );
            }
        }
    }

    async fn broadcast_except(&self, exclude: &UserId, content: &str) {
        for (user_id, sender) in self.registry.senders_except(exclude).await {
            if let Err(e) = sender.send(content.to_string()) {
                tracing::warn!(
                    "Failed to broadcast to user '{}': {}",
                    user_id.as_str(),
                    e
                );
            }
        }
    }
}
