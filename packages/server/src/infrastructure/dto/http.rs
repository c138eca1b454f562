//! HTTP API wire format.

use serde::{Deserialize, Serialize};

use super::websocket::{MessageDto, UserDto};

/// チャット一覧の 1 要素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryDto {
    pub id: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
    /// RFC 3339 (UTC)
    pub last_activity: String,
    pub other_users: Vec<UserDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageDto>,
    pub message_count: usize,
}

/// チャット作成・取得のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDto {
    pub id: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// `POST /api/chats` のリクエストボディ
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub other_user_id: String,
}

/// `GET /api/chats/{chat_id}/messages` のクエリパラメータ
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    50
}
