//! UseCase 層のエラー定義

use thiserror::Error;

use crate::{domain::ValueObjectError, infrastructure::dto::websocket::ServerEvent};

/// セッション操作（認証・入室・ルーム作成・送信）のエラー
///
/// いずれもプロセスを止めず、要求元の接続へ通知イベントとして返される。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("Room \"{0}\" does not exist")]
    RoomNotFound(String),

    #[error("Invalid room name: \"{0}\"")]
    InvalidRoomName(String),

    #[error("Room \"{0}\" already exists")]
    RoomAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Connection is already logged in as \"{0}\"")]
    AlreadyAuthenticated(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] ValueObjectError),

    #[error("Account service is unavailable, try again later")]
    StoreUnavailable,
}

impl SessionError {
    /// 要求元の接続に送る通知イベント
    pub fn to_event(&self) -> ServerEvent {
        match self {
            SessionError::InvalidCredentials
            | SessionError::AlreadyAuthenticated(_)
            | SessionError::StoreUnavailable => ServerEvent::LoginError(self.to_string()),
            _ => ServerEvent::RoomError(self.to_string()),
        }
    }
}

/// アカウント登録・ログインのエラー（HTTP API）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Username and password are required")]
    MissingFields,

    #[error("Invalid username: {0}")]
    InvalidUsername(ValueObjectError),

    #[error("Username \"{0}\" is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}
