//! InMemory Chat Repository 実装
//!
//! ドメイン層が定義する ChatRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! リレーショナルストアの代わりにプロセス内のストアを使用しています。
//! InMemory 実装では許容される妥協ですが、将来 PostgreSQL などの DBMS を
//! 実装する際は、この trait の背後に SQL 実装を差し込みます。
//!
//! 全操作は単一の Mutex の下で行われるため、`create_message` の
//! 「メッセージ行の作成 + `last_activity` 更新」は単一トランザクションに
//! 相当します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Chat, ChatId, ChatMessage, ChatRepository, ChatSummary, MessageContent, RepositoryError,
    Timestamp, UserId, UserProfile,
};

/// インメモリのデータストア
#[derive(Default)]
struct Store {
    users: HashMap<UserId, UserProfile>,
    chats: HashMap<ChatId, Chat>,
    /// 参加者の結合エンティティ。(chatId, userId) の組は一意。
    participants: HashSet<(ChatId, UserId)>,
    /// チャットごとのメッセージ履歴（作成順）
    messages: HashMap<ChatId, Vec<ChatMessage>>,
}

/// インメモリ Chat Repository 実装
pub struct InMemoryChatRepository {
    store: Mutex<Store>,
}

impl InMemoryChatRepository {
    /// 新しい空の InMemoryChatRepository を作成
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    /// ユーザーを投入する（デモ・テスト用）
    pub async fn seed_user(&self, user: UserProfile) {
        let mut store = self.store.lock().await;
        store.users.insert(user.id.clone(), user);
    }

    /// 参加者付きのチャットを投入する（デモ・テスト用）
    pub async fn seed_chat(&self, chat_id: ChatId, participant_ids: Vec<UserId>, now: Timestamp) {
        let mut store = self.store.lock().await;
        store.chats.insert(
            chat_id.clone(),
            Chat {
                id: chat_id.clone(),
                created_at: now,
                last_activity: now,
            },
        );
        for user_id in participant_ids {
            store.participants.insert((chat_id.clone(), user_id));
        }
    }

    /// チャットの `last_activity` を取得（テスト用）
    pub async fn last_activity_of(&self, chat_id: &ChatId) -> Option<Timestamp> {
        let store = self.store.lock().await;
        store.chats.get(chat_id).map(|chat| chat.last_activity)
    }

    /// チャットのメッセージ件数を取得（テスト用）
    pub async fn message_count_of(&self, chat_id: &ChatId) -> usize {
        let store = self.store.lock().await;
        store
            .messages
            .get(chat_id)
            .map(|messages| messages.len())
            .unwrap_or(0)
    }
}

impl Default for InMemoryChatRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.users.get(user_id).cloned())
    }

    async fn chat_ids_for_user(&self, user_id: &UserId) -> Result<Vec<ChatId>, RepositoryError> {
        let store = self.store.lock().await;
        let mut chat_ids: Vec<ChatId> = store
            .participants
            .iter()
            .filter(|(_, participant_id)| participant_id == user_id)
            .map(|(chat_id, _)| chat_id.clone())
            .collect();
        chat_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(chat_ids)
    }

    async fn is_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError> {
        let store = self.store.lock().await;
        if !store.chats.contains_key(chat_id) {
            return Ok(false);
        }
        Ok(store
            .participants
            .contains(&(chat_id.clone(), user_id.clone())))
    }

    async fn participants_of(&self, chat_id: &ChatId) -> Result<Vec<UserId>, RepositoryError> {
        let store = self.store.lock().await;
        let mut user_ids: Vec<UserId> = store
            .participants
            .iter()
            .filter(|(participant_chat_id, _)| participant_chat_id == chat_id)
            .map(|(_, user_id)| user_id.clone())
            .collect();
        user_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(user_ids)
    }

    async fn create_message(
        &self,
        chat_id: &ChatId,
        sender_id: &UserId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<ChatMessage, RepositoryError> {
        // 1 回のロック獲得の中で行挿入と last_activity 更新を行う（トランザクション相当）
        let mut store = self.store.lock().await;

        let sender = store
            .users
            .get(sender_id)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(sender_id.as_str().to_string()))?;

        let chat = store
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| RepositoryError::ChatNotFound(chat_id.as_str().to_string()))?;
        chat.last_activity = timestamp;

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.clone(),
            sender,
            content,
            created_at: timestamp,
        };
        store
            .messages
            .entry(chat_id.clone())
            .or_default()
            .push(message.clone());

        Ok(message)
    }

    async fn list_chats_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ChatSummary>, RepositoryError> {
        let store = self.store.lock().await;
        let mut summaries: Vec<ChatSummary> = store
            .chats
            .values()
            .filter(|chat| {
                store
                    .participants
                    .contains(&(chat.id.clone(), user_id.clone()))
            })
            .map(|chat| {
                let other_users: Vec<UserProfile> = store
                    .participants
                    .iter()
                    .filter(|(chat_id, participant_id)| {
                        chat_id == &chat.id && participant_id != user_id
                    })
                    .filter_map(|(_, participant_id)| store.users.get(participant_id).cloned())
                    .collect();
                let messages = store.messages.get(&chat.id);
                ChatSummary {
                    id: chat.id.clone(),
                    created_at: chat.created_at,
                    last_activity: chat.last_activity,
                    other_users,
                    last_message: messages.and_then(|m| m.last().cloned()),
                    message_count: messages.map(|m| m.len()).unwrap_or(0),
                }
            })
            .collect();
        // 直近のアクティビティ順
        summaries.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(summaries)
    }

    async fn list_messages(
        &self,
        chat_id: &ChatId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let store = self.store.lock().await;
        if !store.chats.contains_key(chat_id) {
            return Err(RepositoryError::ChatNotFound(chat_id.as_str().to_string()));
        }
        let messages = match store.messages.get(chat_id) {
            Some(messages) => messages,
            None => return Ok(Vec::new()),
        };
        // 新しい順にページを選択し、ページ内は古い順で返す
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let mut selected: Vec<ChatMessage> = messages
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        selected.reverse();
        Ok(selected)
    }

    async fn create_or_find_direct_chat(
        &self,
        user_id: &UserId,
        other_user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError> {
        let mut store = self.store.lock().await;

        // 既存の 2 人チャットを探す
        let existing = store
            .chats
            .values()
            .find(|chat| {
                let members: Vec<&UserId> = store
                    .participants
                    .iter()
                    .filter(|(chat_id, _)| chat_id == &chat.id)
                    .map(|(_, member_id)| member_id)
                    .collect();
                members.len() == 2
                    && members.contains(&user_id)
                    && members.contains(&other_user_id)
            })
            .cloned();
        if let Some(chat) = existing {
            return Ok(chat);
        }

        let chat_id = ChatId::new(Uuid::new_v4().to_string())
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let chat = Chat {
            id: chat_id.clone(),
            created_at: now,
            last_activity: now,
        };
        store.chats.insert(chat_id.clone(), chat.clone());
        store.participants.insert((chat_id.clone(), user_id.clone()));
        store
            .participants
            .insert((chat_id, other_user_id.clone()));
        Ok(chat)
    }
}
