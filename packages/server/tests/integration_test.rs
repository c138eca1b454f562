//! Integration tests driving the server in-process over real WebSocket and
//! HTTP connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

use tsumugi_server::{
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
use tsumugi_shared::time::{SystemClock, get_utc_timestamp};

const TEST_SECRET: &str = "integration-test-secret";

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// In-process test server bound to an ephemeral port.
///
/// Seeded with users alice, bob and carol, and one chat "chat-1" whose
/// participants are alice and bob.
struct TestApp {
    addr: SocketAddr,
}

impl TestApp {
    async fn spawn() -> Self {
        let repository = Arc::new(InMemoryChatRepository::new());
        repository
            .seed_user(profile("alice", "Alice"))
            .await;
        repository.seed_user(profile("bob", "Bob")).await;
        repository.seed_user(profile("carol", "Carol")).await;
        repository
            .seed_chat(
                ChatId::new("chat-1".to_string()).unwrap(),
                vec![user_id("alice"), user_id("bob")],
                Timestamp::new(get_utc_timestamp()),
            )
            .await;

        let registry = Arc::new(SessionRegistry::new());
        let pusher = Arc::new(WebSocketEventPusher::new(registry.clone()));
        let verifier = Arc::new(JwtTokenVerifier::new(TEST_SECRET));
        let clock = Arc::new(SystemClock);

        let server = Server::new(
            Arc::new(AuthenticateConnectionUseCase::new(
                verifier.clone(),
                repository.clone(),
            )),
            Arc::new(ConnectUserUseCase::new(
                registry.clone(),
                repository.clone(),
                pusher.clone(),
                clock.clone(),
            )),
            Arc::new(DisconnectUserUseCase::new(registry.clone(), pusher.clone())),
            Arc::new(SendMessageUseCase::new(
                repository.clone(),
                pusher.clone(),
                clock.clone(),
            )),
            Arc::new(JoinChatUseCase::new(repository.clone(), pusher.clone())),
            Arc::new(NotifyTypingUseCase::new(pusher.clone())),
            Arc::new(ListChatsUseCase::new(repository.clone())),
            Arc::new(ListMessagesUseCase::new(repository.clone())),
            Arc::new(CreateChatUseCase::new(repository.clone(), clock)),
            "accessToken".to_string(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .await
                .expect("Server task failed");
        });

        TestApp { addr }
    }

    fn token_for(&self, user_id: &str) -> String {
        issue_access_token(TEST_SECRET, &self::user_id(user_id), 900)
    }

    fn expired_token_for(&self, user_id: &str) -> String {
        issue_access_token(TEST_SECRET, &self::user_id(user_id), -900)
    }

    fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a WebSocket client and consume the initial online_users event.
    async fn connect(&self, user_id: &str) -> WsClient {
        let (mut ws, _) = connect_async(self.ws_url(&self.token_for(user_id)))
            .await
            .expect("WebSocket handshake failed");
        let first = recv_event(&mut ws).await;
        assert_eq!(first["event"], "online_users");
        ws
    }
}

fn user_id(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

fn profile(id: &str, name: &str) -> UserProfile {
    UserProfile::new(user_id(id), name.to_string(), None)
}

/// Receive the next JSON text frame, failing the test on timeout.
async fn recv_event(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Connection closed unexpectedly")
            .expect("WebSocket read failed");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Event was not valid JSON");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {other:?}"),
        }
    }
}

async fn send_event(ws: &mut WsClient, json: &str) {
    ws.send(Message::Text(json.into()))
        .await
        .expect("WebSocket send failed");
}

fn handshake_status(result: Result<(WsClient, tungstenite::handshake::client::Response), tungstenite::Error>) -> u16 {
    match result {
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        Ok(_) => panic!("Handshake unexpectedly succeeded"),
        Err(other) => panic!("Unexpected handshake error: {other:?}"),
    }
}

#[tokio::test]
async fn test_handshake_without_token_is_rejected() {
    // テスト項目: トークン無しのハンドシェイクが 401 で拒否される
    // given (前提条件):
    let app = TestApp::spawn().await;

    // when (操作):
    let result = connect_async(format!("ws://{}/ws", app.addr)).await;

    // then (期待する結果):
    assert_eq!(handshake_status(result), 401);
}

#[tokio::test]
async fn test_handshake_with_expired_token_is_rejected() {
    // テスト項目: 期限切れトークンのハンドシェイクが 401 で拒否される
    // given (前提条件):
    let app = TestApp::spawn().await;

    // when (操作):
    let result = connect_async(app.ws_url(&app.expired_token_for("alice"))).await;

    // then (期待する結果):
    assert_eq!(handshake_status(result), 401);
}

#[tokio::test]
async fn test_handshake_with_unknown_user_is_rejected() {
    // テスト項目: 存在しないユーザーのトークンでは接続できない
    // given (前提条件):
    let app = TestApp::spawn().await;

    // when (操作):
    let result = connect_async(app.ws_url(&app.token_for("ghost"))).await;

    // then (期待する結果):
    assert_eq!(handshake_status(result), 401);
}

#[tokio::test]
async fn test_message_fan_out_to_sender_and_recipient() {
    // テスト項目: メッセージが送信者（送達確認）と相手の両方に配送される
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;
    // alice には bob の user_online が届く
    let online = recv_event(&mut alice).await;
    assert_eq!(online["event"], "user_online");

    // when (操作): alice がメッセージを送信
    send_event(
        &mut alice,
        r#"{"event":"send_message","data":{"chatId":"chat-1","content":"Hello, Bob!"}}"#,
    )
    .await;

    // then (期待する結果): alice は receive_message（個人）→ new_message（ルーム）の順
    let personal = recv_event(&mut alice).await;
    assert_eq!(personal["event"], "receive_message");
    assert_eq!(personal["data"]["chatId"], "chat-1");
    assert_eq!(personal["data"]["message"]["content"], "Hello, Bob!");
    assert_eq!(personal["data"]["message"]["user"]["id"], "alice");
    let room = recv_event(&mut alice).await;
    assert_eq!(room["event"], "new_message");

    // bob にも同じ 2 通が届く
    let personal = recv_event(&mut bob).await;
    assert_eq!(personal["event"], "receive_message");
    assert_eq!(personal["data"]["message"]["content"], "Hello, Bob!");
    let room = recv_event(&mut bob).await;
    assert_eq!(room["event"], "new_message");
    assert_eq!(room["data"]["message"]["user"]["id"], "alice");
}

#[tokio::test]
async fn test_non_participant_send_is_rejected_without_side_effects() {
    // テスト項目: 非参加者の送信が error イベントで拒否され、履歴に残らない
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut carol = app.connect("carol").await;

    // when (操作): carol は chat-1 の参加者ではない
    send_event(
        &mut carol,
        r#"{"event":"send_message","data":{"chatId":"chat-1","content":"sneaky"}}"#,
    )
    .await;

    // then (期待する結果): carol に error イベントが返る
    let error = recv_event(&mut carol).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["message"], "Invalid chat or unauthorized access");

    // 履歴にも残っていない（参加者 alice の HTTP API で確認）
    let client = reqwest::Client::new();
    let messages: serde_json::Value = client
        .get(app.http_url("/api/chats/chat-1/messages"))
        .bearer_auth(app.token_for("alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(messages, serde_json::json!([]));
}

#[tokio::test]
async fn test_missing_fields_send_is_rejected() {
    // テスト項目: chatId 欠落の送信が error イベントで拒否される
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;

    // when (操作):
    send_event(
        &mut alice,
        r#"{"event":"send_message","data":{"content":"no chat id"}}"#,
    )
    .await;

    // then (期待する結果):
    let error = recv_event(&mut alice).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["message"], "Chat ID and content are required");
}

#[tokio::test]
async fn test_malformed_event_is_rejected_and_connection_survives() {
    // テスト項目: 不正なペイロードは error イベントになり、接続は維持される
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;

    // when (操作):
    send_event(&mut alice, r#"{"event":"self_destruct","data":{}}"#).await;

    // then (期待する結果): error イベントの後も通常のイベントを処理できる
    let error = recv_event(&mut alice).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["message"], "Invalid event payload");

    send_event(
        &mut alice,
        r#"{"event":"send_message","data":{"chatId":"chat-1","content":"still alive"}}"#,
    )
    .await;
    let personal = recv_event(&mut alice).await;
    assert_eq!(personal["event"], "receive_message");
}

#[tokio::test]
async fn test_presence_online_and_offline_broadcast() {
    // テスト項目: 接続で user_online、切断で user_offline が他の接続に届く
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;

    // when (操作): bob が接続して切断する
    let mut bob = app.connect("bob").await;
    let online = recv_event(&mut alice).await;
    assert_eq!(online["event"], "user_online");
    assert_eq!(online["data"]["userId"], "bob");
    assert_eq!(online["data"]["user"]["name"], "Bob");

    bob.close(None).await.expect("Failed to close connection");

    // then (期待する結果):
    let offline = recv_event(&mut alice).await;
    assert_eq!(offline["event"], "user_offline");
    assert_eq!(offline["data"]["userId"], "bob");
}

#[tokio::test]
async fn test_online_users_snapshot_on_connect() {
    // テスト項目: 接続直後の online_users に既存の接続ユーザーが含まれる
    // given (前提条件):
    let app = TestApp::spawn().await;
    let _alice = app.connect("alice").await;

    // when (操作):
    let (mut bob, _) = connect_async(app.ws_url(&app.token_for("bob")))
        .await
        .expect("WebSocket handshake failed");

    // then (期待する結果):
    let snapshot = recv_event(&mut bob).await;
    assert_eq!(snapshot["event"], "online_users");
    assert_eq!(snapshot["data"]["users"][0]["id"], "alice");
}

#[tokio::test]
async fn test_join_chat_ack_and_rejection() {
    // テスト項目: 参加者の join_chat には ack、非参加者には error が返る
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut bob = app.connect("bob").await;
    let mut carol = app.connect("carol").await;
    // bob には carol の user_online が届く
    let online = recv_event(&mut bob).await;
    assert_eq!(online["event"], "user_online");

    // when (操作):
    send_event(&mut bob, r#"{"event":"join_chat","data":{"chatId":"chat-1"}}"#).await;
    send_event(
        &mut carol,
        r#"{"event":"join_chat","data":{"chatId":"chat-1"}}"#,
    )
    .await;

    // then (期待する結果):
    let ack = recv_event(&mut bob).await;
    assert_eq!(ack["event"], "joined_chat");
    assert_eq!(ack["data"]["chatId"], "chat-1");

    let error = recv_event(&mut carol).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["message"], "Unauthorized access to chat");
}

#[tokio::test]
async fn test_typing_indicator_reaches_peer_but_not_sender() {
    // テスト項目: typing_start が相手に届き、送信者自身には返らない
    // given (前提条件):
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;
    let online = recv_event(&mut alice).await;
    assert_eq!(online["event"], "user_online");

    // when (操作):
    send_event(
        &mut alice,
        r#"{"event":"typing_start","data":{"chatId":"chat-1"}}"#,
    )
    .await;

    // then (期待する結果): bob に user_typing が届く
    let typing = recv_event(&mut bob).await;
    assert_eq!(typing["event"], "user_typing");
    assert_eq!(typing["data"]["userId"], "alice");
    assert_eq!(typing["data"]["chatId"], "chat-1");

    // alice 自身には返らない：次にメッセージを送ると receive_message が先頭に来る
    send_event(
        &mut alice,
        r#"{"event":"send_message","data":{"chatId":"chat-1","content":"done typing"}}"#,
    )
    .await;
    let next = recv_event(&mut alice).await;
    assert_eq!(next["event"], "receive_message");

    // 停止通知も同様に相手にだけ届く
    send_event(
        &mut alice,
        r#"{"event":"typing_stop","data":{"chatId":"chat-1"}}"#,
    )
    .await;
    // bob はメッセージ 2 通の後に user_stopped_typing を受信する
    let personal = recv_event(&mut bob).await;
    assert_eq!(personal["event"], "receive_message");
    let room = recv_event(&mut bob).await;
    assert_eq!(room["event"], "new_message");
    let stopped = recv_event(&mut bob).await;
    assert_eq!(stopped["event"], "user_stopped_typing");
    assert_eq!(stopped["data"]["userId"], "alice");
}

#[tokio::test]
async fn test_http_health_check() {
    // テスト項目: ヘルスチェックエンドポイントが ok を返す
    // given (前提条件):
    let app = TestApp::spawn().await;

    // when (操作):
    let response: serde_json::Value = reqwest::get(app.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_http_chat_api_requires_authentication() {
    // テスト項目: 認証無しの HTTP API アクセスが 401 で拒否される
    // given (前提条件):
    let app = TestApp::spawn().await;

    // when (操作):
    let response = reqwest::get(app.http_url("/api/chats")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_http_create_chat_and_list_chats() {
    // テスト項目: チャットの作成・再利用と一覧取得が HTTP API で行える
    // given (前提条件):
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    // when (操作): alice が carol とのチャットを 2 回作成する
    let first: serde_json::Value = client
        .post(app.http_url("/api/chats"))
        .bearer_auth(app.token_for("alice"))
        .json(&serde_json::json!({"otherUserId": "carol"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = client
        .post(app.http_url("/api/chats"))
        .bearer_auth(app.token_for("alice"))
        .json(&serde_json::json!({"otherUserId": "carol"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果): 2 回目は同じチャットが返る
    assert_eq!(first["id"], second["id"]);

    // alice の一覧には chat-1 と新しいチャットの 2 件が載る
    let chats: serde_json::Value = client
        .get(app.http_url("/api/chats"))
        .bearer_auth(app.token_for("alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let chats = chats.as_array().unwrap();
    assert_eq!(chats.len(), 2);

    // 相手ユーザーの情報が otherUsers に載る
    let new_chat = chats
        .iter()
        .find(|c| c["id"] == first["id"])
        .expect("Created chat missing from list");
    assert_eq!(new_chat["otherUsers"][0]["id"], "carol");
}

#[tokio::test]
async fn test_http_create_chat_with_unknown_user_is_404() {
    // テスト項目: 存在しない相手とのチャット作成が 404 になる
    // given (前提条件):
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .post(app.http_url("/api/chats"))
        .bearer_auth(app.token_for("alice"))
        .json(&serde_json::json!({"otherUserId": "ghost"}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_http_message_history_pagination() {
    // テスト項目: メッセージ履歴がページ分割され、ページ内は時系列順になる
    // given (前提条件): alice が chat-1 に 3 通送る
    let app = TestApp::spawn().await;
    let mut alice = app.connect("alice").await;
    for i in 1..=3 {
        send_event(
            &mut alice,
            &format!(r#"{{"event":"send_message","data":{{"chatId":"chat-1","content":"m{i}"}}}}"#),
        )
        .await;
        // 自分宛の receive_message と new_message を消化して順序を確定させる
        let personal = recv_event(&mut alice).await;
        assert_eq!(personal["event"], "receive_message");
        let room = recv_event(&mut alice).await;
        assert_eq!(room["event"], "new_message");
    }

    // when (操作): 1 ページ 2 件で最新ページを取得
    let client = reqwest::Client::new();
    let page1: serde_json::Value = client
        .get(app.http_url("/api/chats/chat-1/messages?page=1&limit=2"))
        .bearer_auth(app.token_for("bob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page2: serde_json::Value = client
        .get(app.http_url("/api/chats/chat-1/messages?page=2&limit=2"))
        .bearer_auth(app.token_for("bob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    let contents = |page: &serde_json::Value| -> Vec<String> {
        page.as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(contents(&page1), vec!["m2", "m3"]);
    assert_eq!(contents(&page2), vec!["m1"]);
}

#[tokio::test]
async fn test_http_message_history_rejects_non_participant() {
    // テスト項目: 非参加者の履歴閲覧が 403 で拒否される
    // given (前提条件):
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(app.http_url("/api/chats/chat-1/messages"))
        .bearer_auth(app.token_for("carol"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status().as_u16(), 403);
}
