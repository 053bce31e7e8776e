//! Repository traits for the external stores.
//!
//! The domain layer only defines the interfaces; implementations live in
//! `infrastructure::repository` (dependency inversion).

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{
    entity::{Account, MessageRecord},
    error::RepositoryError,
    value_object::{RoomName, Username},
};

/// Account Store: credentials by username
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_username(&self, username: &Username)
    -> Result<Option<Account>, RepositoryError>;

    /// Store a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateUsername` if the username is taken.
    async fn create(&self, account: Account) -> Result<Account, RepositoryError>;
}

/// Message Store: ordered append and range query by room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, record: MessageRecord) -> Result<(), RepositoryError>;

    /// The newest `limit` records of `room`, in ascending timestamp order.
    async fn recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, RepositoryError>;

    /// Canonical names of every room holding at least one record.
    async fn distinct_rooms(&self) -> Result<BTreeSet<String>, RepositoryError>;
}
