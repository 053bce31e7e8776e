//! UseCase: セッション管理（Session Manager）
//!
//! 接続 → 認証済み ID の対応とルーム所属を一元管理する唯一の更新者。
//! Room Registry・セッション表・送信チャンネルを 1 つの Mutex で保護し、
//! 所属の変更とその結果の配信を同じクリティカルセクション内で行う。
//!
//! ## 排他制御の方針
//!
//! - Account Store / Message Store への問い合わせ（I/O）はロックの外で先に行う
//! - ロック取得後に接続状態・ルームの存在を再検証してから変更を確定する
//! - 配信はチャンネルへの enqueue のみ（await しない）なので、ロック内で行う
//! - 入室時の履歴は、取得後・確定前に配信されたレコードをロック内で補う
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - authenticate / join / create / disconnect の状態遷移と配信内容
//!
//! ### なぜこのテストが必要か
//! - 1 接続が同時に 2 つのルームに所属しないことを保証する
//! - 失敗した操作が状態を変更しないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン → デフォルトルーム入室 → ルーム作成 → 入室
//! - 異常系：未認証、存在しないルーム、予約名、重複作成
//! - エッジケース：二重認証、未認証接続の切断、Message Store 障害

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::{
    domain::{
        AccountRepository, ConnectionId, MessageKind, MessageRecord, MessageRepository, RoomName,
        RoomRegistry, SessionState, Timestamp, Username,
    },
    infrastructure::dto::websocket::{MessageDto, ServerEvent},
};

use super::{
    broadcaster::{EventBroadcaster, EventSender},
    error::SessionError,
    room_resolver::RoomResolver,
};

/// 入室時に送る履歴の既定件数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Mutex で保護される共有状態
struct ChatState {
    registry: RoomRegistry,
    sessions: HashMap<ConnectionId, SessionState>,
    broadcaster: EventBroadcaster,
    /// ルーム正規名 → 直近に配信したレコード（最大 `history_limit` 件）
    published: HashMap<String, VecDeque<MessageRecord>>,
    history_limit: usize,
}

impl ChatState {
    fn identity_of(&self, connection_id: &ConnectionId) -> Result<Username, SessionError> {
        self.sessions
            .get(connection_id)
            .and_then(SessionState::identity)
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// `room` に入室させる。元のルームからは退出する。
    ///
    /// 呼び出し前に接続が認証済みであることを確認しておくこと。
    fn enter_room(&mut self, connection_id: ConnectionId, room: &RoomName) {
        let Some(session) = self.sessions.get_mut(&connection_id) else {
            return;
        };
        let Some(identity) = session.identity().cloned() else {
            return;
        };
        if let Some(previous) = session.current_room() {
            self.registry.remove_member(previous, &connection_id);
        }
        self.registry.ensure_room(room);
        self.registry.add_member(room, connection_id);
        *session = SessionState::InRoom {
            identity,
            room: room.clone(),
        };
    }

    fn known_rooms(&self, persisted: &BTreeSet<String>) -> Vec<String> {
        RoomResolver::merge(self.registry.live_room_names(), persisted)
    }

    fn publish_room_list(&self, persisted: &BTreeSet<String>) {
        let rooms = self.known_rooms(persisted);
        self.broadcaster.to_all(ServerEvent::ActiveRoomsList(rooms));
    }

    fn remember_published(&mut self, record: &MessageRecord) {
        if self.history_limit == 0 {
            return;
        }
        let recent = self
            .published
            .entry(record.room.as_str().to_string())
            .or_default();
        if recent.len() == self.history_limit {
            recent.pop_front();
        }
        recent.push_back(record.clone());
    }

    /// ロック外で取得した履歴に、取得後に配信されたレコードを補う
    ///
    /// 取得済みのレコードとは等価比較で重複を除き、古い順で直近
    /// `history_limit` 件に切り詰める。
    fn complete_history(
        &self,
        room: &RoomName,
        mut history: Vec<MessageRecord>,
    ) -> Vec<MessageRecord> {
        let Some(published) = self.published.get(room.as_str()) else {
            return history;
        };

        let mut fetched = history.clone();
        for record in published {
            match fetched.iter().position(|r| r == record) {
                Some(index) => {
                    fetched.swap_remove(index);
                }
                None => history.push(record.clone()),
            }
        }

        // 安定ソート：同一タイムスタンプは取得順 → 配信順
        history.sort_by_key(|record| record.timestamp);
        let skip = history.len().saturating_sub(self.history_limit);
        history.split_off(skip)
    }
}

/// Session Manager
pub struct SessionManager {
    state: Mutex<ChatState>,
    accounts: Arc<dyn AccountRepository>,
    messages: Arc<dyn MessageRepository>,
    resolver: RoomResolver,
    history_limit: usize,
}

impl SessionManager {
    /// 新しい SessionManager を作成
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        messages: Arc<dyn MessageRepository>,
        history_limit: usize,
    ) -> Self {
        Self {
            state: Mutex::new(ChatState {
                registry: RoomRegistry::new(),
                sessions: HashMap::new(),
                broadcaster: EventBroadcaster::new(),
                published: HashMap::new(),
                history_limit,
            }),
            accounts,
            resolver: RoomResolver::new(messages.clone()),
            messages,
            history_limit,
        }
    }

    /// 新しい接続を匿名状態で登録
    pub async fn connect(&self, connection_id: ConnectionId, sender: EventSender) {
        let mut state = self.state.lock().await;
        state.sessions.insert(connection_id, SessionState::Anonymous);
        state.broadcaster.register(connection_id, sender);
        tracing::info!("Connection '{}' opened", connection_id);
    }

    /// 接続に ID を割り当て、デフォルトルームへ入室させる
    ///
    /// 同じ ID での再認証は何もしない（入室は最初の 1 回のみ）。
    pub async fn authenticate(
        &self,
        connection_id: ConnectionId,
        username: &str,
    ) -> Result<(), SessionError> {
        let identity = Username::new(username).map_err(|_| SessionError::InvalidCredentials)?;

        // I/O はロックの外で行う
        match self.accounts.find_by_username(&identity).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(SessionError::InvalidCredentials),
            Err(e) => {
                tracing::error!("Account lookup for '{}' failed: {}", identity, e);
                return Err(SessionError::StoreUnavailable);
            }
        }
        let persisted = self.resolver.persisted_rooms().await;

        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(&connection_id)
            .ok_or(SessionError::NotAuthenticated)?;

        match session.identity() {
            Some(current) if current == &identity => return Ok(()),
            Some(current) => {
                return Err(SessionError::AlreadyAuthenticated(current.to_string()));
            }
            None => {}
        }
        *session = SessionState::Authenticated {
            identity: identity.clone(),
        };

        let default_room = RoomName::default_room();
        state.enter_room(connection_id, &default_room);
        state.publish_room_list(&persisted);
        state.broadcaster.to_room(
            &state.registry,
            &default_room,
            ServerEvent::UserConnected(identity.to_string()),
        );
        tracing::info!(
            "Connection '{}' authenticated as '{}'",
            connection_id,
            identity
        );
        Ok(())
    }

    /// 既知のルームへ入室
    ///
    /// 入室者には履歴（古い順）→ room-joined の順で送る。
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        requested: &str,
    ) -> Result<RoomName, SessionError> {
        self.ensure_authenticated(connection_id).await?;
        let room = RoomName::new(requested)
            .map_err(|_| SessionError::RoomNotFound(requested.trim().to_string()))?;

        let persisted = self.resolver.persisted_rooms().await;
        let history = self.fetch_history(&room).await;

        let mut state = self.state.lock().await;
        // ロック外の I/O の間に切断されていないか再検証
        let identity = state.identity_of(&connection_id)?;
        let known = room.is_default()
            || state.registry.contains(&room)
            || persisted.contains(room.as_str());
        if !known {
            return Err(SessionError::RoomNotFound(room.display_name().to_string()));
        }

        let history = state.complete_history(&room, history);
        state.enter_room(connection_id, &room);
        state.broadcaster.to_connection(
            &connection_id,
            ServerEvent::PreviousMessages(history.iter().map(MessageDto::from).collect()),
        );
        state.broadcaster.to_connection(
            &connection_id,
            ServerEvent::RoomJoined(room.display_name().to_string()),
        );
        state.broadcaster.to_room(
            &state.registry,
            &room,
            ServerEvent::UserConnected(identity.to_string()),
        );
        state.publish_room_list(&persisted);
        tracing::info!("'{}' joined room '{}'", identity, room);
        Ok(room)
    }

    /// 空のルームを作成（作成者は入室しない）
    pub async fn create(
        &self,
        connection_id: ConnectionId,
        requested: &str,
    ) -> Result<RoomName, SessionError> {
        self.ensure_authenticated(connection_id).await?;
        let room = RoomName::new(requested)
            .map_err(|_| SessionError::InvalidRoomName(requested.trim().to_string()))?;
        if room.is_default() {
            return Err(SessionError::InvalidRoomName(
                room.display_name().to_string(),
            ));
        }

        let persisted = self.resolver.persisted_rooms().await;

        let mut state = self.state.lock().await;
        let identity = state.identity_of(&connection_id)?;
        if state.registry.contains(&room) || persisted.contains(room.as_str()) {
            return Err(SessionError::RoomAlreadyExists(
                room.display_name().to_string(),
            ));
        }

        state.registry.ensure_room(&room);
        state.broadcaster.to_connection(
            &connection_id,
            ServerEvent::RoomCreated(room.display_name().to_string()),
        );
        state.publish_room_list(&persisted);
        tracing::info!("'{}' created room '{}'", identity, room);
        Ok(room)
    }

    /// 現在のルームへメッセージを配信し、配信したレコードを返す
    ///
    /// 永続化は呼び出し側がロックの外で行う。`requested_room` が現在のルームと
    /// 異なる場合はサーバー側の現在のルームを優先する。
    pub async fn publish(
        &self,
        connection_id: ConnectionId,
        kind: MessageKind,
        requested_room: Option<&str>,
    ) -> Result<MessageRecord, SessionError> {
        let mut state = self.state.lock().await;
        let (identity, room) = match state.sessions.get(&connection_id) {
            Some(SessionState::InRoom { identity, room }) => (identity.clone(), room.clone()),
            _ => return Err(SessionError::NotAuthenticated),
        };

        if let Some(requested) = requested_room
            && let Ok(requested) = RoomName::new(requested)
            && requested != room
        {
            tracing::warn!(
                "'{}' addressed room '{}' while in '{}'; delivering to current room",
                identity,
                requested,
                room
            );
        }

        let record = MessageRecord::new(room, identity, kind, Timestamp::now());
        state.broadcaster.to_room(
            &state.registry,
            &record.room,
            ServerEvent::for_record(&record),
        );
        state.remember_published(&record);
        Ok(record)
    }

    /// 全接続へルーム一覧を再配信
    pub async fn refresh_room_list(&self) {
        let persisted = self.resolver.persisted_rooms().await;
        let state = self.state.lock().await;
        state.publish_room_list(&persisted);
    }

    /// 切断処理。認証済みだった場合はその ID を返す
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Option<Username> {
        let persisted = self.resolver.persisted_rooms().await;

        let mut state = self.state.lock().await;
        state.broadcaster.unregister(&connection_id);
        let session = state.sessions.remove(&connection_id)?;
        let identity = session.identity().cloned()?;

        if let Some(room) = session.current_room() {
            state.registry.remove_member(room, &connection_id);
            state.broadcaster.to_room(
                &state.registry,
                room,
                ServerEvent::UserDisconnected(identity.to_string()),
            );
        }
        state.publish_room_list(&persisted);
        tracing::info!("'{}' disconnected (connection '{}')", identity, connection_id);
        Some(identity)
    }

    /// 1 接続へ通知（エラー通知など）
    pub async fn notify(&self, connection_id: ConnectionId, event: ServerEvent) {
        let state = self.state.lock().await;
        state.broadcaster.to_connection(&connection_id, event);
    }

    /// 既知のルーム一覧（デフォルトルームが先頭）
    pub async fn known_rooms(&self) -> Vec<String> {
        let persisted = self.resolver.persisted_rooms().await;
        let state = self.state.lock().await;
        state.known_rooms(&persisted)
    }

    /// 既知のルームとその現在のメンバー数
    pub async fn room_summaries(&self) -> Vec<(String, usize)> {
        let persisted = self.resolver.persisted_rooms().await;
        let state = self.state.lock().await;
        state
            .known_rooms(&persisted)
            .into_iter()
            .map(|name| {
                let members = RoomName::new(&name)
                    .map(|room| state.registry.members_of(&room).len())
                    .unwrap_or_default();
                (name, members)
            })
            .collect()
    }

    pub async fn members_of(&self, room: &RoomName) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state.registry.members_of(room)
    }

    pub async fn session_state(&self, connection_id: &ConnectionId) -> Option<SessionState> {
        let state = self.state.lock().await;
        state.sessions.get(connection_id).cloned()
    }

    /// 接続が所属しているルーム数（常に 0 か 1）
    pub async fn membership_count(&self, connection_id: &ConnectionId) -> usize {
        let state = self.state.lock().await;
        state.registry.membership_count(connection_id)
    }

    pub async fn connection_count(&self) -> usize {
        let state = self.state.lock().await;
        state.sessions.len()
    }

    async fn ensure_authenticated(&self, connection_id: ConnectionId) -> Result<(), SessionError> {
        let state = self.state.lock().await;
        state.identity_of(&connection_id).map(|_| ())
    }

    async fn fetch_history(&self, room: &RoomName) -> Vec<MessageRecord> {
        match self.messages.recent(room, self.history_limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Could not load history of room '{}': {}", room, e);
                Vec::new()
            }
        }
    }
}
