//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    AuthenticateConnectionUseCase, ConnectUserUseCase, CreateChatUseCase, DisconnectUserUseCase,
    JoinChatUseCase, ListChatsUseCase, ListMessagesUseCase, NotifyTypingUseCase, SendMessageUseCase,
};

use super::{
    handler::{create_chat, health_check, list_chats, list_messages, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Real-time chat server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     authenticate_connection_usecase,
///     connect_user_usecase,
///     disconnect_user_usecase,
///     send_message_usecase,
///     join_chat_usecase,
///     notify_typing_usecase,
///     list_chats_usecase,
///     list_messages_usecase,
///     create_chat_usecase,
///     "accessToken".to_string(),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// AuthenticateConnectionUseCase（接続認証のユースケース）
    authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
    /// ConnectUserUseCase（ユーザー接続のユースケース）
    connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（ユーザー切断のユースケース）
    disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// JoinChatUseCase（明示的なルーム参加のユースケース）
    join_chat_usecase: Arc<JoinChatUseCase>,
    /// NotifyTypingUseCase（タイピング通知中継のユースケース）
    notify_typing_usecase: Arc<NotifyTypingUseCase>,
    /// ListChatsUseCase（チャット一覧取得のユースケース）
    list_chats_usecase: Arc<ListChatsUseCase>,
    /// ListMessagesUseCase（メッセージ履歴取得のユースケース）
    list_messages_usecase: Arc<ListMessagesUseCase>,
    /// CreateChatUseCase（ダイレクトチャット作成のユースケース）
    create_chat_usecase: Arc<CreateChatUseCase>,
    /// トークンのフォールバック読み出しに使う Cookie 名
    cookie_name: String,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
        connect_user_usecase: Arc<ConnectUserUseCase>,
        disconnect_user_usecase: Arc<DisconnectUserUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        join_chat_usecase: Arc<JoinChatUseCase>,
        notify_typing_usecase: Arc<NotifyTypingUseCase>,
        list_chats_usecase: Arc<ListChatsUseCase>,
        list_messages_usecase: Arc<ListMessagesUseCase>,
        create_chat_usecase: Arc<CreateChatUseCase>,
        cookie_name: String,
    ) -> Self {
        Self {
            authenticate_connection_usecase,
            connect_user_usecase,
            disconnect_user_usecase,
            send_message_usecase,
            join_chat_usecase,
            notify_typing_usecase,
            list_chats_usecase,
            list_messages_usecase,
            create_chat_usecase,
            cookie_name,
        }
    }

    /// Build the axum router with all routes and shared state
    ///
    /// Exposed separately from `run` so integration tests can serve the
    /// router on an ephemeral port.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            authenticate_connection_usecase: self.authenticate_connection_usecase,
            connect_user_usecase: self.connect_user_usecase,
            disconnect_user_usecase: self.disconnect_user_usecase,
            send_message_usecase: self.send_message_usecase,
            join_chat_usecase: self.join_chat_usecase,
            notify_typing_usecase: self.notify_typing_usecase,
            list_chats_usecase: self.list_chats_usecase,
            list_messages_usecase: self.list_messages_usecase,
            create_chat_usecase: self.create_chat_usecase,
            cookie_name: self.cookie_name,
        });

        // Define handlers
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chats", get(list_chats).post(create_chat))
            .route("/api/chats/{chat_id}/messages", get(list_messages))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the real-time chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Real-time chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
