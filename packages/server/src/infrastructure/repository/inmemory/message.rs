//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! ルームの正規名ごとに挿入順でレコードを保持します。
//! プロセス終了とともに履歴は失われます。

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessageRecord, MessageRepository, RepositoryError, RoomName};

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    /// ルーム正規名 → メッセージ（挿入順）
    messages: Mutex<HashMap<String, Vec<MessageRecord>>>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, record: MessageRecord) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages
            .entry(record.room.as_str().to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, RepositoryError> {
        let mut records = {
            let messages = self.messages.lock().await;
            messages.get(room.as_str()).cloned().unwrap_or_default()
        };

        // 安定ソート：同一タイムスタンプは挿入順を維持
        records.sort_by_key(|record| record.timestamp);
        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }

    async fn distinct_rooms(&self) -> Result<BTreeSet<String>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(room, _)| room.clone())
            .collect())
    }
}
