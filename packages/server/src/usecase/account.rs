//! UseCase: アカウント登録・ログイン（HTTP API）
//!
//! パスワードのハッシュ化・検証は CPU 負荷が高いため spawn_blocking で実行する。

use std::sync::Arc;

use crate::{
    domain::{Account, AccountRepository, RepositoryError, Username},
    infrastructure::password::{hash_password, verify_password},
};

use super::error::AccountError;

/// アカウント登録のユースケース
pub struct RegisterAccountUseCase {
    accounts: Arc<dyn AccountRepository>,
}

impl RegisterAccountUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// アカウントを登録し、登録したユーザー名を返す
    pub async fn execute(&self, username: &str, password: &str) -> Result<Username, AccountError> {
        let (username, password) = validate_credentials(username, password)?;

        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let account = self
            .accounts
            .create(Account::new(username, hash))
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateUsername(name) => AccountError::DuplicateUsername(name),
                other => AccountError::Internal(other.to_string()),
            })?;

        tracing::info!("Registered account '{}'", account.username);
        Ok(account.username)
    }
}

/// ログインのユースケース
pub struct LoginUseCase {
    accounts: Arc<dyn AccountRepository>,
}

impl LoginUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// 資格情報を検証し、ユーザー名を返す
    pub async fn execute(&self, username: &str, password: &str) -> Result<Username, AccountError> {
        let (username, password) = validate_credentials(username, password)?;

        let account = self
            .accounts
            .find_by_username(&username)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .ok_or(AccountError::InvalidCredentials)?;

        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        if !valid {
            tracing::warn!("Failed login attempt for '{}'", username);
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account.username)
    }
}

/// ユーザー名・パスワードは trim 後に必須
fn validate_credentials(
    username: &str,
    password: &str,
) -> Result<(Username, String), AccountError> {
    let password = password.trim();
    if username.trim().is_empty() || password.is_empty() {
        return Err(AccountError::MissingFields);
    }
    let username = Username::new(username).map_err(AccountError::InvalidUsername)?;
    Ok((username, password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MockAccountRepository, infrastructure::repository::InMemoryAccountRepository,
    };

    #[tokio::test]
    async fn test_register_then_login() {
        // テスト項目: 登録したアカウントでログインできる
        // given (前提条件):
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let register = RegisterAccountUseCase::new(accounts.clone());
        let login = LoginUseCase::new(accounts.clone());

        // when (操作):
        register.execute(" alice ", "segredo123").await.unwrap();
        let result = login.execute("alice", " segredo123 ").await;

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
        let stored = accounts
            .find_by_username(&Username::new("alice").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "segredo123");
    }

    #[tokio::test]
    async fn test_register_duplicate_fails() {
        // テスト項目: 同じユーザー名での二重登録は DuplicateUsername
        // given (前提条件):
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let register = RegisterAccountUseCase::new(accounts);
        register.execute("alice", "segredo123").await.unwrap();

        // when (操作):
        let result = register.execute("alice", "outra").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(AccountError::DuplicateUsername("alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_fields() {
        // テスト項目: ユーザー名・パスワードが空の場合は MissingFields
        // given (前提条件):
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let register = RegisterAccountUseCase::new(accounts.clone());
        let login = LoginUseCase::new(accounts);

        // then (期待する結果):
        assert_eq!(
            register.execute("  ", "x").await,
            Err(AccountError::MissingFields)
        );
        assert_eq!(
            login.execute("alice", " ").await,
            Err(AccountError::MissingFields)
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        // テスト項目: パスワード誤り・未登録ユーザーは InvalidCredentials
        // given (前提条件):
        let accounts = Arc::new(InMemoryAccountRepository::new());
        RegisterAccountUseCase::new(accounts.clone())
            .execute("alice", "segredo123")
            .await
            .unwrap();
        let login = LoginUseCase::new(accounts);

        // then (期待する結果):
        assert_eq!(
            login.execute("alice", "errada").await,
            Err(AccountError::InvalidCredentials)
        );
        assert_eq!(
            login.execute("ghost", "segredo123").await,
            Err(AccountError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_login_store_unavailable_is_internal() {
        // テスト項目: Account Store 障害時は Internal エラー
        // given (前提条件):
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_username()
            .returning(|_| Err(RepositoryError::StoreUnavailable("down".to_string())));
        let login = LoginUseCase::new(Arc::new(accounts));

        // when (操作):
        let result = login.execute("alice", "segredo123").await;

        // then (期待する結果):
        assert!(matches!(result, Err(AccountError::Internal(_))));
    }
}
