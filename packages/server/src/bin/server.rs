//! Real-time chat server for the social-networking backend.
//!
//! Serves a JWT-gated WebSocket endpoint for messaging, presence and typing
//! indicators, plus an HTTP API for chat and message history access.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsumugi-server
//! cargo run --bin tsumugi-server -- --host 0.0.0.0 --port 3000 --seed-demo
//! ```

use std::sync::Arc;

use clap::Parser;
use tsumugi_server::{
    config::AuthConfig,
    domain::{ChatId, Timestamp, UserId, UserProfile},
    infrastructure::{
        auth::{JwtTokenVerifier, issue_access_token},
        event_pusher::WebSocketEventPusher,
        repository::InMemoryChatRepository,
        session::SessionRegistry,
    },
    ui::Server,
    usecase::{
        AuthenticateConnectionUseCase, ConnectUserUseCase, CreateChatUseCase,
        DisconnectUserUseCase, JoinChatUseCase, ListChatsUseCase, ListMessagesUseCase,
        NotifyTypingUseCase, SendMessageUseCase,
    },
};
use tsumugi_shared::{
    logger::setup_logger,
    time::{SystemClock, get_utc_timestamp},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Real-time chat server with presence support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seed two demo users with a shared chat and log their access tokens
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let auth_config = AuthConfig::from_env();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. SessionRegistry
    // 3. EventPusher
    // 4. TokenVerifier
    // 5. Clock
    // 6. UseCases
    // 7. Server

    // 1. Create Repository (in-memory database)
    let repository = Arc::new(InMemoryChatRepository::new());
    if args.seed_demo {
        seed_demo_data(&repository, &auth_config).await;
    }

    // 2. Create SessionRegistry (connected user ledger)
    let registry = Arc::new(SessionRegistry::new());

    // 3. Create EventPusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketEventPusher::new(registry.clone()));

    // 4. Create TokenVerifier (HS256 JWT)
    let verifier = Arc::new(JwtTokenVerifier::new(&auth_config.access_secret));

    // 5. Create Clock
    let clock = Arc::new(SystemClock);

    // 6. Create UseCases
    let authenticate_connection_usecase = Arc::new(AuthenticateConnectionUseCase::new(
        verifier.clone(),
        repository.clone(),
    ));
    let connect_user_usecase = Arc::new(ConnectUserUseCase::new(
        registry.clone(),
        repository.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let disconnect_user_usecase =
        Arc::new(DisconnectUserUseCase::new(registry.clone(), pusher.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let join_chat_usecase = Arc::new(JoinChatUseCase::new(repository.clone(), pusher.clone()));
    let notify_typing_usecase = Arc::new(NotifyTypingUseCase::new(pusher.clone()));
    let list_chats_usecase = Arc::new(ListChatsUseCase::new(repository.clone()));
    let list_messages_usecase = Arc::new(ListMessagesUseCase::new(repository.clone()));
    let create_chat_usecase = Arc::new(CreateChatUseCase::new(repository.clone(), clock.clone()));

    // 7. Create and run the server
    let server = Server::new(
        authenticate_connection_usecase,
        connect_user_usecase,
        disconnect_user_usecase,
        send_message_usecase,
        join_chat_usecase,
        notify_typing_usecase,
        list_chats_usecase,
        list_messages_usecase,
        create_chat_usecase,
        auth_config.cookie_name,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Seed two demo users sharing one chat, and log access tokens for both.
async fn seed_demo_data(repository: &Arc<InMemoryChatRepository>, auth_config: &AuthConfig) {
    let alice_id = match UserId::new("alice".to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to seed demo data: {}", e);
            return;
        }
    };
    let bob_id = match UserId::new("bob".to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to seed demo data: {}", e);
            return;
        }
    };
    let chat_id = match ChatId::new("demo-chat".to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to seed demo data: {}", e);
            return;
        }
    };

    repository
        .seed_user(UserProfile::new(
            alice_id.clone(),
            "Alice".to_string(),
            None,
        ))
        .await;
    repository
        .seed_user(UserProfile::new(bob_id.clone(), "Bob".to_string(), None))
        .await;
    repository
        .seed_chat(
            chat_id.clone(),
            vec![alice_id.clone(), bob_id.clone()],
            Timestamp::new(get_utc_timestamp()),
        )
        .await;

    for user_id in [&alice_id, &bob_id] {
        let token = issue_access_token(
            &auth_config.access_secret,
            user_id,
            auth_config.access_ttl_secs,
        );
        tracing::info!("Demo token for '{}': {}", user_id.as_str(), token);
    }
    tracing::info!("Seeded demo chat '{}' for alice and bob", chat_id.as_str());
}
