//! テスト用：`recent` / `append` を途中で止められる Message Repository
//!
//! 呼び出しが Store に入った時点を観測し、任意のタイミングで完了させることで
//! ロック外 I/O と他の操作のインターリーブを再現する。

use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::InMemoryMessageRepository;
use crate::domain::{MessageRecord, MessageRepository, RepositoryError, RoomName};

/// 次の 1 回の呼び出しを止めるゲート
#[derive(Default)]
pub struct Gate {
    armed: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// 次の呼び出しで停止させる
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// 停止中の呼び出しが Store に入るまで待つ
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// 停止中の呼び出しを再開させる
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[derive(Default)]
pub struct GatedMessageRepository {
    inner: InMemoryMessageRepository,
    recent_gate: Gate,
    append_gate: Gate,
}

impl GatedMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recent_gate(&self) -> &Gate {
        &self.recent_gate
    }

    pub fn append_gate(&self) -> &Gate {
        &self.append_gate
    }
}

#[async_trait]
impl MessageRepository for GatedMessageRepository {
    async fn append(&self, record: MessageRecord) -> Result<(), RepositoryError> {
        self.append_gate.pass().await;
        self.inner.append(record).await
    }

    async fn recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, RepositoryError> {
        self.recent_gate.pass().await;
        self.inner.recent(room, limit).await
    }

    async fn distinct_rooms(&self) -> Result<BTreeSet<String>, RepositoryError> {
        self.inner.distinct_rooms().await
    }
}
