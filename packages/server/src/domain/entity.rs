//! エンティティ定義

use super::value_object::{ChatId, MessageContent, Timestamp, UserId};

/// ユーザーの公開プロフィール（Principal のスナップショット）
///
/// 認証済み接続に紐付く不変の識別子と、プロフィールサブシステムが所有する
/// 公開フィールドのスナップショット。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(id: UserId, name: String, avatar_url: Option<String>) -> Self {
        Self {
            id,
            name,
            avatar_url,
        }
    }
}

/// チャットルーム（会話）
///
/// 参加者は 1 人以上。`last_activity` は新規メッセージのたびに更新されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
}

/// チャットメッセージ
///
/// ちょうど 1 つの Chat と 1 人の送信者に属し、作成後は不変です。
/// 送信者の公開プロフィールを含むハイドレート済みの形で永続化層から返されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: ChatId,
    pub sender: UserProfile,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

/// チャット一覧表示用の射影
///
/// 自分以外の参加者のプロフィールと最新メッセージを含みます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: ChatId,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
    pub other_users: Vec<UserProfile>,
    pub last_message: Option<ChatMessage>,
    pub message_count: usize,
}
