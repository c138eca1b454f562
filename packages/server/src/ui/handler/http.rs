//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};

use crate::{
    domain::{ChatId, UserProfile},
    infrastructure::auth::extract_token_from_cookie,
    infrastructure::dto::http::{ChatDto, ChatSummaryDto, CreateChatRequest, MessagesQuery},
    infrastructure::dto::websocket::MessageDto,
    ui::state::AppState,
    usecase::{CreateChatError, ListMessagesError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Resolve and authenticate the caller from `Authorization: Bearer` or the cookie.
async fn authenticate_request(
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<UserProfile, StatusCode> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string());
    let token = bearer.or_else(|| {
        headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| extract_token_from_cookie(cookies, &state.cookie_name))
    });

    state
        .authenticate_connection_usecase
        .execute(token.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!("HTTP request rejected: {}", e);
            StatusCode::UNAUTHORIZED
        })
}

/// Get the caller's chat list, most recently active first
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatSummaryDto>>, StatusCode> {
    let user = authenticate_request(&state, &headers).await?;

    let summaries = state
        .list_chats_usecase
        .execute(&user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list chats: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Domain Model から DTO への変換
    let dtos: Vec<ChatSummaryDto> = summaries.into_iter().map(ChatSummaryDto::from).collect();
    Ok(Json(dtos))
}

/// Create a direct chat with another user, or return the existing one
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateChatRequest>,
) -> Result<Json<ChatDto>, StatusCode> {
    let user = authenticate_request(&state, &headers).await?;

    match state
        .create_chat_usecase
        .execute(&user.id, &request.other_user_id)
        .await
    {
        Ok(chat) => Ok(Json(chat.into())),
        Err(CreateChatError::OtherUserMissing) | Err(CreateChatError::SelfChat) => {
            Err(StatusCode::BAD_REQUEST)
        }
        Err(CreateChatError::OtherUserNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(CreateChatError::Repository(e)) => {
            tracing::error!("Failed to create chat: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a page of message history for a chat (participants only, oldest first)
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let user = authenticate_request(&state, &headers).await?;

    let chat_id = ChatId::new(chat_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state
        .list_messages_usecase
        .execute(&user.id, &chat_id, query.page, query.limit)
        .await
    {
        Ok(messages) => {
            // Domain Model から DTO への変換
            let dtos: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();
            Ok(Json(dtos))
        }
        Err(ListMessagesError::Unauthorized) => Err(StatusCode::FORBIDDEN),
        Err(ListMessagesError::Repository(e)) => {
            tracing::error!("Failed to load messages: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
