//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Chat, ChatMessage, ChatSummary, UserProfile},
    error::RepositoryError,
    value_object::{ChatId, MessageContent, Timestamp, UserId},
};

/// Chat Repository trait
///
/// リレーショナルストアへの狭いインターフェース。UseCase 層はこの trait に
/// 依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// ユーザーの公開プロフィールを取得（存在しない場合は None）
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// ユーザーが参加している全てのチャット ID を取得
    async fn chat_ids_for_user(&self, user_id: &UserId) -> Result<Vec<ChatId>, RepositoryError>;

    /// ユーザーがチャットの参加者かどうかを確認
    ///
    /// チャットが存在しない場合も false を返す（存在確認と参加者確認を兼ねる）。
    async fn is_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError>;

    /// チャットの現在の参加者 ID 一覧を取得
    async fn participants_of(&self, chat_id: &ChatId) -> Result<Vec<UserId>, RepositoryError>;

    /// メッセージを永続化する
    ///
    /// メッセージ行の作成と Chat の `last_activity` 更新は単一のトランザクションで
    /// 行わなければならない。送信者のプロフィールを含むハイドレート済みの
    /// メッセージを返す。
    async fn create_message(
        &self,
        chat_id: &ChatId,
        sender_id: &UserId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<ChatMessage, RepositoryError>;

    /// ユーザーのチャット一覧を取得（`last_activity` の降順）
    async fn list_chats_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ChatSummary>, RepositoryError>;

    /// チャットのメッセージ履歴をページ単位で取得
    ///
    /// 新しい順にページを選択し、ページ内は古い順で返す。
    async fn list_messages(
        &self,
        chat_id: &ChatId,
        page: usize,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// 2 人のユーザー間のダイレクトチャットを取得、なければ作成する
    async fn create_or_find_direct_chat(
        &self,
        user_id: &UserId,
        other_user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError>;
}
