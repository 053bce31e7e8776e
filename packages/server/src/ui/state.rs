//! Shared application state.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{AccountRepository, MessageRepository},
    infrastructure::repository::{InMemoryAccountRepository, InMemoryMessageRepository},
    usecase::SessionManager,
};

/// Shared application state
pub struct AppState {
    /// Sole owner of room membership and connection identities
    pub sessions: Arc<SessionManager>,
    /// Account Store
    pub accounts: Arc<dyn AccountRepository>,
    /// Message Store
    pub messages: Arc<dyn MessageRepository>,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        messages: Arc<dyn MessageRepository>,
        history_limit: usize,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(
            accounts.clone(),
            messages.clone(),
            history_limit,
        ));
        Self {
            sessions,
            accounts,
            messages,
        }
    }

    /// State backed by the in-memory stores
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
            config.history_limit,
        )
    }
}
