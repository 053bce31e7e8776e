//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::send_text() / send_audio()
//! - 配信（現在のルームのメンバー）と永続化（Message Store）
//!
//! ### なぜこのテストが必要か
//! - 配信優先・永続化はベストエフォートの方針を保証する
//! - 不正なペイロードが配信・永続化されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキスト・音声メッセージの送信
//! - 異常系：空メッセージ、不正な base64、未認証
//! - エッジケース：Message Store 障害時も配信は行われる

use std::sync::Arc;

use tagarela_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    AudioPayload, ConnectionId, MessageKind, MessageRecord, MessageRepository, MessageText,
};

use super::{error::SessionError, session_manager::SessionManager};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    sessions: Arc<SessionManager>,
    /// Repository（データアクセス層の抽象化）
    messages: Arc<dyn MessageRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(sessions: Arc<SessionManager>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { sessions, messages }
    }

    /// テキストメッセージを送信
    pub async fn send_text(
        &self,
        connection_id: ConnectionId,
        text: &str,
        room: Option<&str>,
    ) -> Result<MessageRecord, SessionError> {
        let kind = MessageKind::Text(MessageText::new(text)?);
        self.execute(connection_id, kind, room).await
    }

    /// 音声メッセージ（base64）を送信
    pub async fn send_audio(
        &self,
        connection_id: ConnectionId,
        audio: String,
        room: Option<&str>,
    ) -> Result<MessageRecord, SessionError> {
        let kind = MessageKind::Audio(AudioPayload::new(audio)?);
        self.execute(connection_id, kind, room).await
    }

    /// メッセージ送信を実行
    ///
    /// 1. 現在のルームのメンバーへ配信（ロック内）
    /// 2. Message Store へ保存（ロック外）。失敗してもログのみ
    async fn execute(
        &self,
        connection_id: ConnectionId,
        kind: MessageKind,
        room: Option<&str>,
    ) -> Result<MessageRecord, SessionError> {
        let record = self.sessions.publish(connection_id, kind, room).await?;

        if let Err(e) = self.messages.append(record.clone()).await {
            tracing::warn!(
                "{} message from '{}' in room '{}' at {} was delivered but not persisted: {}",
                record.kind.as_str(),
                record.author,
                record.room,
                timestamp_to_rfc3339(record.timestamp.value()),
                e
            );
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Account, AccountRepository, ConnectionIdFactory, MockMessageRepository,
            RepositoryError, RoomName, Username, ValueObjectError,
        },
        infrastructure::{
            dto::websocket::ServerEvent,
            repository::{InMemoryAccountRepository, InMemoryMessageRepository},
        },
        usecase::{OUTBOUND_QUEUE_CAPACITY, session_manager::DEFAULT_HISTORY_LIMIT},
    };
    use std::collections::BTreeSet;
    use tokio::sync::mpsc::{self, Receiver};

    async fn create_session_manager(
        messages: Arc<dyn MessageRepository>,
    ) -> Arc<SessionManager> {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        for name in ["alice", "bob"] {
            accounts
                .create(Account::new(Username::new(name).unwrap(), String::new()))
                .await
                .unwrap();
        }
        Arc::new(SessionManager::new(accounts, messages, DEFAULT_HISTORY_LIMIT))
    }

    async fn login(
        sessions: &SessionManager,
        name: &str,
    ) -> (ConnectionId, Receiver<ServerEvent>) {
        let id = ConnectionIdFactory::generate();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        sessions.connect(id, tx).await;
        sessions.authenticate(id, name).await.unwrap();
        while rx.try_recv().is_ok() {}
        (id, rx)
    }

    #[tokio::test]
    async fn test_send_text_broadcasts_and_persists() {
        // テスト項目: テキスト送信はルームのメンバー全員（送信者含む）に届き、保存される
        // given (前提条件):
        let messages = Arc::new(InMemoryMessageRepository::new());
        let sessions = create_session_manager(messages.clone()).await;
        let usecase = SendMessageUseCase::new(sessions.clone(), messages.clone());
        let (bob, mut rx_bob) = login(&sessions, "bob").await;
        let (_alice, mut rx_alice) = login(&sessions, "alice").await;
        while rx_bob.try_recv().is_ok() {}

        // when (操作):
        let result = usecase.send_text(bob, " hi ", Some("Público")).await;

        // then (期待する結果):
        let record = result.unwrap();
        for rx in [&mut rx_bob, &mut rx_alice] {
            match rx.try_recv().unwrap() {
                ServerEvent::NewMessage(dto) => {
                    assert_eq!(dto.username, "bob");
                    assert_eq!(dto.message.as_deref(), Some("hi"));
                    assert_eq!(dto.room, "público");
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        let stored = messages.recent(&RoomName::default_room(), 50).await.unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn test_send_audio_broadcasts_new_audio() {
        // テスト項目: 音声送信は new-audio として配信される
        // given (前提条件):
        let messages = Arc::new(InMemoryMessageRepository::new());
        let sessions = create_session_manager(messages.clone()).await;
        let usecase = SendMessageUseCase::new(sessions.clone(), messages);
        let (bob, mut rx_bob) = login(&sessions, "bob").await;

        // when (操作):
        let result = usecase
            .send_audio(bob, "T2dnUwACAAAA".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        match rx_bob.try_recv().unwrap() {
            ServerEvent::NewAudio(dto) => {
                assert_eq!(dto.audio.as_deref(), Some("T2dnUwACAAAA"));
                assert!(dto.message.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_invalid_payloads_rejected() {
        // テスト項目: 空のテキスト・不正な base64 は配信も保存もされない
        // given (前提条件):
        let messages = Arc::new(InMemoryMessageRepository::new());
        let sessions = create_session_manager(messages.clone()).await;
        let usecase = SendMessageUseCase::new(sessions.clone(), messages.clone());
        let (bob, mut rx_bob) = login(&sessions, "bob").await;

        // when (操作):
        let empty = usecase.send_text(bob, "   ", None).await;
        let bad_audio = usecase.send_audio(bob, "%%%".to_string(), None).await;

        // then (期待する結果):
        assert_eq!(
            empty,
            Err(SessionError::InvalidMessage(ValueObjectError::MessageTextEmpty))
        );
        assert_eq!(
            bad_audio,
            Err(SessionError::InvalidMessage(
                ValueObjectError::AudioInvalidEncoding
            ))
        );
        assert!(rx_bob.try_recv().is_err());
        assert!(messages.distinct_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_authentication() {
        // テスト項目: 未認証の接続からの送信は NotAuthenticated
        // given (前提条件):
        let messages = Arc::new(InMemoryMessageRepository::new());
        let sessions = create_session_manager(messages.clone()).await;
        let usecase = SendMessageUseCase::new(sessions.clone(), messages);
        let anon = ConnectionIdFactory::generate();
        let (tx, _rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        sessions.connect(anon, tx).await;

        // when (操作):
        let result = usecase.send_text(anon, "hi", None).await;

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_send_still_delivers_when_store_fails() {
        // テスト項目: 保存に失敗しても配信は行われ、送信は成功扱い
        // given (前提条件):
        let mut store = MockMessageRepository::new();
        store
            .expect_distinct_rooms()
            .returning(|| Ok(BTreeSet::new()));
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(RepositoryError::StoreUnavailable("down".to_string())));
        let store: Arc<dyn MessageRepository> = Arc::new(store);
        let sessions = create_session_manager(store.clone()).await;
        let usecase = SendMessageUseCase::new(sessions.clone(), store);
        let (bob, mut rx_bob) = login(&sessions, "bob").await;

        // when (操作):
        let result = usecase.send_text(bob, "hi", None).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(matches!(rx_bob.try_recv(), Ok(ServerEvent::NewMessage(_))));
    }
}
