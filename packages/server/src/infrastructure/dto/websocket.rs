//! WebSocket message DTOs for the chat application.
//!
//! Every frame is a JSON object `{ "type": <event-name>, "data": <payload> }`.

use serde::{Deserialize, Serialize};

use crate::domain::{MessageKind, MessageRecord};

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Username of an account registered through the HTTP API
    Authenticate(String),
    SendMessage(SendMessagePayload),
    SendAudio(SendAudioPayload),
    CreateRoom(String),
    JoinRoom(String),
    RequestActiveRooms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAudioPayload {
    /// Base64-encoded audio clip
    pub audio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    NewMessage(MessageDto),
    NewAudio(MessageDto),
    /// History of the joined room, oldest first
    PreviousMessages(Vec<MessageDto>),
    UserConnected(String),
    UserDisconnected(String),
    RoomCreated(String),
    RoomJoined(String),
    RoomError(String),
    LoginError(String),
    ActiveRoomsList(Vec<String>),
}

impl ServerEvent {
    /// Room-scoped notification for a freshly published record
    pub fn for_record(record: &MessageRecord) -> Self {
        let dto = MessageDto::from(record);
        match record.kind {
            MessageKind::Text(_) => ServerEvent::NewMessage(dto),
            MessageKind::Audio(_) => ServerEvent::NewAudio(dto),
        }
    }
}

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Audio,
}

/// A chat message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Canonical room name
    pub room: String,
    pub r#type: MessageType,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl From<&MessageRecord> for MessageDto {
    fn from(record: &MessageRecord) -> Self {
        let (r#type, message, audio) = match &record.kind {
            MessageKind::Text(text) => (MessageType::Text, Some(text.as_str().to_string()), None),
            MessageKind::Audio(audio) => {
                (MessageType::Audio, None, Some(audio.as_str().to_string()))
            }
        };
        Self {
            username: record.author.as_str().to_string(),
            message,
            audio,
            room: record.room.as_str().to_string(),
            r#type,
            timestamp: record.timestamp.value(),
        }
    }
}
