//! Event Broadcaster
//!
//! 接続ごとの送信チャンネルを保持し、接続単位・ルーム単位・全体への配信を行う。
//! 配信は fire-and-forget（確認応答・再送なし）。各接続のチャンネルは 1 本なので、
//! 同一接続へのイベント順序は保たれる。
//!
//! チャンネルは容量 `OUTBOUND_QUEUE_CAPACITY` の有界キュー。配信はロック内で
//! 行うため待機せず、満杯の接続（読み取りの遅いクライアント）宛てのイベントは
//! 警告を出して破棄する。

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomName, RoomRegistry},
    infrastructure::dto::websocket::ServerEvent,
};

/// 1 接続あたりの未送信イベントの上限
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// 接続への送信チャンネル
pub type EventSender = mpsc::Sender<ServerEvent>;

/// 接続 ID → 送信チャンネル
#[derive(Default)]
pub struct EventBroadcaster {
    connections: HashMap<ConnectionId, EventSender>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続の送信チャンネルを登録
    pub fn register(&mut self, connection_id: ConnectionId, sender: EventSender) {
        self.connections.insert(connection_id, sender);
    }

    /// 接続の送信チャンネルを削除。登録されていた場合は true
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> bool {
        self.connections.remove(connection_id).is_some()
    }

    /// 1 接続だけに配信
    pub fn to_connection(&self, connection_id: &ConnectionId, event: ServerEvent) {
        match self.connections.get(connection_id) {
            Some(sender) => Self::deliver(connection_id, sender, event),
            None => tracing::debug!("No sender registered for connection '{}'", connection_id),
        }
    }

    /// `room` の現在のメンバー全員に配信
    ///
    /// 呼び出し時点の registry のスナップショットを配信対象とする。
    pub fn to_room(&self, registry: &RoomRegistry, room: &RoomName, event: ServerEvent) {
        for member in registry.members_of(room) {
            if let Some(sender) = self.connections.get(&member) {
                Self::deliver(&member, sender, event.clone());
            }
        }
    }

    /// 全接続（未認証を含む）に配信
    pub fn to_all(&self, event: ServerEvent) {
        for (connection_id, sender) in &self.connections {
            Self::deliver(connection_id, sender, event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn deliver(connection_id: &ConnectionId, sender: &EventSender, event: ServerEvent) {
        match sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    "Outbound queue of connection '{}' is full; dropping event",
                    connection_id
                );
            }
            // 受信側（ソケット送信タスク）が終了済みなら切断処理が後から走る
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to deliver event to connection '{}'", connection_id);
            }
        }
    }
}
