//! InMemory Account Repository 実装
//!
//! ユーザー名をキーとしてアカウント（パスワードハッシュ）を保持します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Account, AccountRepository, RepositoryError, Username};

/// インメモリ Account Repository 実装
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryAccountRepository {
    /// 新しい InMemoryAccountRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(username.as_str()).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.lock().await;
        let key = account.username.as_str().to_string();
        if accounts.contains_key(&key) {
            return Err(RepositoryError::DuplicateUsername(key));
        }
        accounts.insert(key, account.clone());
        Ok(account)
    }
}
