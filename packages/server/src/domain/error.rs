//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("Username cannot be empty")]
    UsernameEmpty,

    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("Room name cannot be empty")]
    RoomNameEmpty,

    #[error("Room name cannot exceed {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    #[error("Message cannot be empty")]
    MessageTextEmpty,

    #[error("Message cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    #[error("Audio payload cannot be empty")]
    AudioEmpty,

    #[error("Audio payload cannot exceed {max} bytes (got {actual})")]
    AudioTooLong { max: usize, actual: usize },

    #[error("Audio payload must be valid base64")]
    AudioInvalidEncoding,
}

/// Errors reported by the Account Store and the Message Store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store could not be reached. Callers degrade instead of failing.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),
}
