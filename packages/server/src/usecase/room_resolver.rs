//! Room Resolver
//!
//! 既知のルーム一覧 = ライブルーム ∪ Message Store に履歴のあるルーム ∪ デフォルトルーム。
//! 並び順はデフォルトルームが先頭、残りは正規名の辞書順。

use std::{collections::BTreeSet, sync::Arc};

use crate::domain::{DEFAULT_ROOM_NAME, MessageRepository};

pub struct RoomResolver {
    messages: Arc<dyn MessageRepository>,
}

impl RoomResolver {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// Message Store に履歴のあるルーム
    ///
    /// Store に到達できない場合は警告を出して空集合を返す（ライブルームのみに縮退）。
    pub async fn persisted_rooms(&self) -> BTreeSet<String> {
        match self.messages.distinct_rooms().await {
            Ok(rooms) => rooms,
            Err(e) => {
                tracing::warn!("Falling back to live rooms only: {}", e);
                BTreeSet::new()
            }
        }
    }

    /// ライブルームと永続化済みルームをマージして並べる
    pub fn merge<I>(live: I, persisted: &BTreeSet<String>) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut rooms: BTreeSet<String> = live.into_iter().collect();
        rooms.extend(persisted.iter().cloned());
        rooms.remove(DEFAULT_ROOM_NAME);

        let mut ordered = Vec::with_capacity(rooms.len() + 1);
        ordered.push(DEFAULT_ROOM_NAME.to_string());
        ordered.extend(rooms);
        ordered
    }
}
