//! Core domain models for the chat application.

use super::value_object::{AudioPayload, MessageText, RoomName, Timestamp, Username};

/// A registered account as kept by the Account Store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: Username,
    /// Argon2 PHC string
    pub password_hash: String,
}

impl Account {
    pub fn new(username: Username, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
        }
    }
}

/// Body of a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text(MessageText),
    Audio(AudioPayload),
}

impl MessageKind {
    /// Wire name of the kind (`text` or `audio`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text(_) => "text",
            MessageKind::Audio(_) => "audio",
        }
    }
}

/// A chat message as persisted by the Message Store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Room the message was posted to (canonical name)
    pub room: RoomName,
    /// Author's identity
    pub author: Username,
    /// Text or audio body
    pub kind: MessageKind,
    /// Timestamp when the message was sent
    pub timestamp: Timestamp,
}

impl MessageRecord {
    /// Create a new message record
    pub fn new(room: RoomName, author: Username, kind: MessageKind, timestamp: Timestamp) -> Self {
        Self {
            room,
            author,
            kind,
            timestamp,
        }
    }
}
