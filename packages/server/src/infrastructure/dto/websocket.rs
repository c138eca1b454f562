//! WebSocket wire format.
//!
//! Every frame is a JSON text message of the shape
//! `{"event": "<name>", "data": { ... }}`. Field names are camelCase on
//! the wire.

use serde::{Deserialize, Serialize};

/// イベント共通エンベロープに載るユーザー表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// ハイドレート済みメッセージの表現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub chat_id: String,
    pub content: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
    pub user: UserDto,
}

/// クライアントから受信するイベント
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    SendMessage {
        #[serde(default)]
        chat_id: Option<String>,
        #[serde(default)]
        content: Option<String>,
        /// 旧クライアント互換のため受理するが、宛先解決には使用しない
        /// （参加者一覧は常にストレージから取得する）
        #[serde(default)]
        receiver_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JoinChat {
        #[serde(default)]
        chat_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    TypingStart { chat_id: String },
    #[serde(rename_all = "camelCase")]
    TypingStop { chat_id: String },
}

/// サーバーから送信するイベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 個人チャンネルへのメッセージ配送（送信者自身にも届く＝送達確認）
    #[serde(rename_all = "camelCase")]
    ReceiveMessage { chat_id: String, message: MessageDto },
    /// ルームチャンネルへのメッセージ配送
    #[serde(rename_all = "camelCase")]
    NewMessage { chat_id: String, message: MessageDto },
    #[serde(rename_all = "camelCase")]
    UserOnline { user_id: String, user: UserDto },
    #[serde(rename_all = "camelCase")]
    UserOffline { user_id: String },
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: String,
        user: UserDto,
        chat_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UserStoppedTyping { user_id: String, chat_id: String },
    #[serde(rename_all = "camelCase")]
    JoinedChat { chat_id: String },
    /// 接続直後に送る、現在オンラインのユーザー一覧
    #[serde(rename_all = "camelCase")]
    OnlineUsers { users: Vec<UserDto> },
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl ServerEvent {
    /// JSON テキストフレームに変換する
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ServerEvent serialization cannot fail")
    }

    /// エラーイベントを作成する
    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            details,
        }
    }
}
