//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Canonical name of the default room.
pub const DEFAULT_ROOM_NAME: &str = "público";

/// Display name of the default room.
pub const DEFAULT_ROOM_DISPLAY_NAME: &str = "Público";

/// Maximum length of a username, in bytes.
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Maximum length of a room name, in bytes.
pub const MAX_ROOM_NAME_LENGTH: usize = 100;

/// Maximum length of a text message, in bytes.
pub const MAX_MESSAGE_TEXT_LENGTH: usize = 10_000;

/// Maximum length of a base64 audio payload, in bytes.
pub const MAX_AUDIO_PAYLOAD_LENGTH: usize = 10 * 1024 * 1024;

/// Connection identifier value object.
///
/// Identifies one live network session. Generated by
/// [`ConnectionIdFactory`](super::factory::ConnectionIdFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object.
///
/// The authenticated identity of a connection. Surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// # Arguments
    ///
    /// * `name` - The username as submitted by the client
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = name.len();
        if len > MAX_USERNAME_LENGTH {
            return Err(ValueObjectError::UsernameTooLong {
                max: MAX_USERNAME_LENGTH,
                actual: len,
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room name value object.
///
/// Holds the canonical (trimmed, lowercased) key together with the display name
/// as submitted. Equality and hashing only look at the canonical key.
#[derive(Debug, Clone)]
pub struct RoomName {
    canonical: String,
    display: String,
}

impl RoomName {
    /// Normalize a submitted room name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let display = name.as_ref().trim();
        if display.is_empty() {
            return Err(ValueObjectError::RoomNameEmpty);
        }
        let len = display.len();
        if len > MAX_ROOM_NAME_LENGTH {
            return Err(ValueObjectError::RoomNameTooLong {
                max: MAX_ROOM_NAME_LENGTH,
                actual: len,
            });
        }
        Ok(Self {
            canonical: display.to_lowercase(),
            display: display.to_string(),
        })
    }

    /// The reserved default room.
    pub fn default_room() -> Self {
        Self {
            canonical: DEFAULT_ROOM_NAME.to_string(),
            display: DEFAULT_ROOM_DISPLAY_NAME.to_string(),
        }
    }

    /// Canonical key.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Name as originally submitted (trimmed).
    pub fn display_name(&self) -> &str {
        &self.display
    }

    pub fn is_default(&self) -> bool {
        self.canonical == DEFAULT_ROOM_NAME
    }
}

impl PartialEq for RoomName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for RoomName {}

impl Hash for RoomName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

/// Text message body.
///
/// Represents the content of a text message with validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText. Surrounding whitespace is removed.
    pub fn new(text: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let len = text.len();
        if len > MAX_MESSAGE_TEXT_LENGTH {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MAX_MESSAGE_TEXT_LENGTH,
                actual: len,
            });
        }
        Ok(Self(text.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Base64-encoded audio clip.
///
/// Kept in its encoded form; it is only decoded to check that it is well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload(String);

impl AudioPayload {
    pub fn new(encoded: impl Into<String>) -> Result<Self, ValueObjectError> {
        let encoded = encoded.into();
        if encoded.is_empty() {
            return Err(ValueObjectError::AudioEmpty);
        }
        let len = encoded.len();
        if len > MAX_AUDIO_PAYLOAD_LENGTH {
            return Err(ValueObjectError::AudioTooLong {
                max: MAX_AUDIO_PAYLOAD_LENGTH,
                actual: len,
            });
        }
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|_| ValueObjectError::AudioInvalidEncoding)?;
        Ok(Self(encoded))
    }

    /// Get the base64 string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current time.
    pub fn now() -> Self {
        Self(tagarela_shared::time::now_millis())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
