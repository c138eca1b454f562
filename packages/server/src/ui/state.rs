//! Server state and connection management.

use std::sync::Arc;

use crate::usecase::{
    AuthenticateConnectionUseCase, ConnectUserUseCase, CreateChatUseCase, DisconnectUserUseCase,
    JoinChatUseCase, ListChatsUseCase, ListMessagesUseCase, NotifyTypingUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// AuthenticateConnectionUseCase（接続認証のユースケース）
    pub authenticate_connection_usecase: Arc<AuthenticateConnectionUseCase>,
    /// ConnectUserUseCase（ユーザー接続のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（ユーザー切断のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// JoinChatUseCase（明示的なルーム参加のユースケース）
    pub join_chat_usecase: Arc<JoinChatUseCase>,
    /// NotifyTypingUseCase（タイピング通知中継のユースケース）
    pub notify_typing_usecase: Arc<NotifyTypingUseCase>,
    /// ListChatsUseCase（チャット一覧取得のユースケース）
    pub list_chats_usecase: Arc<ListChatsUseCase>,
    /// ListMessagesUseCase（メッセージ履歴取得のユースケース）
    pub list_messages_usecase: Arc<ListMessagesUseCase>,
    /// CreateChatUseCase（ダイレクトチャット作成のユースケース）
    pub create_chat_usecase: Arc<CreateChatUseCase>,
    /// トークンのフォールバック読み出しに使う Cookie 名
    pub cookie_name: String,
}
