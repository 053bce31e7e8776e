//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod room_registry;
pub mod session;
pub mod value_object;

pub use entity::{Account, MessageKind, MessageRecord};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use repository::{AccountRepository, MessageRepository};
pub use room_registry::RoomRegistry;
pub use session::SessionState;
pub use value_object::{
    AudioPayload, ConnectionId, DEFAULT_ROOM_DISPLAY_NAME, DEFAULT_ROOM_NAME, MessageText,
    RoomName, Timestamp, Username,
};

#[cfg(test)]
pub use repository::{MockAccountRepository, MockMessageRepository};
