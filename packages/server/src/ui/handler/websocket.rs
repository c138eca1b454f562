//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatId, ConnectionId, PusherChannel, UserProfile},
    infrastructure::auth::extract_token_from_cookie,
    infrastructure::dto::websocket::{ClientEvent, ServerEvent, UserDto},
    ui::state::AppState,
    usecase::{DisconnectOutcome, JoinChatError, SendMessageError, SendMessageInput},
};

use serde::Deserialize;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    // Resolve the access token: explicit query field first, cookie fallback second
    let token = query.token.or_else(|| {
        headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| extract_token_from_cookie(cookies, &state.cookie_name))
    });

    // Authenticate BEFORE the upgrade: a failed handshake never yields a connection
    let user = match state
        .authenticate_connection_usecase
        .execute(token.as_deref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("WebSocket handshake rejected: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    // Create a channel for this client to receive events
    let (tx, rx) = mpsc::unbounded_channel();

    // Register the session and subscribe to chat rooms before the socket opens,
    // so events published in the meantime are already routed to this channel
    let session = state.connect_user_usecase.execute(user.clone(), tx.clone()).await;

    tracing::info!(
        "User '{}' authenticated, upgrading connection",
        user.id.as_str()
    );
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user, session.connection_id, tx, rx)))
}

/// Spawns a task that receives events from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound event flow: events published by other
/// sessions (via the rx channel) are sent to this client's WebSocket connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the event to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    user: UserProfile,
    connection_id: ConnectionId,
    own_tx: PusherChannel,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();
    let user_id = user.id.clone();

    // Send the current online user list to the newly connected client
    {
        let online = state.connect_user_usecase.online_users_except(&user_id).await;
        let users: Vec<UserDto> = online.into_iter().map(UserDto::from).collect();
        let online_json = ServerEvent::OnlineUsers { users }.to_json();
        if let Err(e) = sender.send(Message::Text(online_json.into())).await {
            tracing::error!(
                "Failed to send online users to '{}': {}",
                user_id.as_str(),
                e
            );
            // The socket is already dead; fall through to the disconnect path
        }
    }

    // Broadcast user_online to all other connected clients
    {
        let online_event = ServerEvent::UserOnline {
            user_id: user_id.as_str().to_string(),
            user: user.clone().into(),
        };
        state
            .connect_user_usecase
            .broadcast_online(&user_id, &online_event.to_json())
            .await;
    }

    // Spawn a task to receive events from this client
    let state_clone = state.clone();
    let user_clone = user.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Failed to parse client event: {}", e);
                            let error_json =
                                ServerEvent::error("Invalid event payload", Some(e.to_string()))
                                    .to_json();
                            if own_tx.send(error_json).is_err() {
                                break;
                            }
                            continue;
                        }
                    };
                    dispatch_client_event(&state_clone, &user_clone, event, &own_tx).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("User '{}' requested close", user_clone.id.as_str());
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive events from other sessions and send to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Unregister the session. Only the connection that still owns the registry
    // entry broadcasts user_offline; a superseded connection stays silent.
    let outcome = state
        .disconnect_user_usecase
        .execute(&user_id, &connection_id)
        .await;
    if outcome == DisconnectOutcome::Removed {
        let offline_json = ServerEvent::UserOffline {
            user_id: user_id.as_str().to_string(),
        }
        .to_json();
        state
            .disconnect_user_usecase
            .broadcast_offline(&user_id, &offline_json)
            .await;
    }
}

/// Dispatch a parsed client event to the matching UseCase.
///
/// Validation and authorization failures are non-fatal: they are reported to
/// this client as an `error` event and the connection stays open.
async fn dispatch_client_event(
    state: &Arc<AppState>,
    user: &UserProfile,
    event: ClientEvent,
    own_tx: &PusherChannel,
) {
    match event {
        ClientEvent::SendMessage {
            chat_id,
            content,
            receiver_id: _,
        } => {
            let input = SendMessageInput { chat_id, content };
            match state.send_message_usecase.execute(&user.id, input).await {
                Ok((message, participants)) => {
                    let chat_id = message.chat_id.clone();
                    let message_dto = crate::infrastructure::dto::websocket::MessageDto::from(
                        message,
                    );
                    let personal_json = ServerEvent::ReceiveMessage {
                        chat_id: chat_id.as_str().to_string(),
                        message: message_dto.clone(),
                    }
                    .to_json();
                    let room_json = ServerEvent::NewMessage {
                        chat_id: chat_id.as_str().to_string(),
                        message: message_dto,
                    }
                    .to_json();
                    state
                        .send_message_usecase
                        .deliver(&chat_id, &participants, &personal_json, &room_json)
                        .await;
                }
                Err(SendMessageError::Repository(e)) => {
                    tracing::error!("Failed to persist message: {}", e);
                    let error_json =
                        ServerEvent::error("Failed to send message", Some(e.to_string())).to_json();
                    let _ = own_tx.send(error_json);
                }
                Err(e) => {
                    tracing::warn!(
                        "Rejected send_message from '{}': {}",
                        user.id.as_str(),
                        e
                    );
                    let _ = own_tx.send(ServerEvent::error(e.to_string(), None).to_json());
                }
            }
        }
        ClientEvent::JoinChat { chat_id } => {
            match state.join_chat_usecase.execute(&user.id, chat_id).await {
                Ok(chat_id) => {
                    let ack_json = ServerEvent::JoinedChat {
                        chat_id: chat_id.into_string(),
                    }
                    .to_json();
                    let _ = own_tx.send(ack_json);
                }
                Err(JoinChatError::Repository(e)) => {
                    tracing::error!("Failed to verify chat membership: {}", e);
                    let error_json =
                        ServerEvent::error("Failed to join chat", Some(e.to_string())).to_json();
                    let _ = own_tx.send(error_json);
                }
                Err(e) => {
                    tracing::warn!("Rejected join_chat from '{}': {}", user.id.as_str(), e);
                    let _ = own_tx.send(ServerEvent::error(e.to_string(), None).to_json());
                }
            }
        }
        ClientEvent::TypingStart { chat_id } => {
            relay_typing(state, user, chat_id, true).await;
        }
        ClientEvent::TypingStop { chat_id } => {
            relay_typing(state, user, chat_id, false).await;
        }
    }
}

/// Relay a typing indicator to the chat room, excluding the sender.
async fn relay_typing(state: &Arc<AppState>, user: &UserProfile, raw_chat_id: String, start: bool) {
    let chat_id = match ChatId::new(raw_chat_id) {
        Ok(chat_id) => chat_id,
        Err(_) => {
            tracing::debug!("Ignoring typing event without chat id");
            return;
        }
    };
    let event = if start {
        ServerEvent::UserTyping {
            user_id: user.id.as_str().to_string(),
            user: user.clone().into(),
            chat_id: chat_id.as_str().to_string(),
        }
    } else {
        ServerEvent::UserStoppedTyping {
            user_id: user.id.as_str().to_string(),
            chat_id: chat_id.as_str().to_string(),
        }
    };
    state
        .notify_typing_usecase
        .relay(&chat_id, &user.id, &event.to_json())
        .await;
}
