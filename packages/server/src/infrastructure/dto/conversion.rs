//! Conversion logic between domain entities and DTOs.

use tsumugi_shared::time::timestamp_to_rfc3339;

use crate::domain::entity;
use crate::infrastructure::dto::http::{ChatDto, ChatSummaryDto};
use crate::infrastructure::dto::websocket::{MessageDto, UserDto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::UserProfile> for UserDto {
    fn from(model: entity::UserProfile) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            avatar_url: model.avatar_url,
        }
    }
}

impl From<entity::ChatMessage> for MessageDto {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id,
            chat_id: model.chat_id.into_string(),
            content: model.content.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            user: model.sender.into(),
        }
    }
}

impl From<entity::Chat> for ChatDto {
    fn from(model: entity::Chat) -> Self {
        Self {
            id: model.id.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<entity::ChatSummary> for ChatSummaryDto {
    fn from(model: entity::ChatSummary) -> Self {
        Self {
            id: model.id.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            last_activity: timestamp_to_rfc3339(model.last_activity.value()),
            other_users: model.other_users.into_iter().map(UserDto::from).collect(),
            last_message: model.last_message.map(MessageDto::from),
            message_count: model.message_count,
        }
    }
}
