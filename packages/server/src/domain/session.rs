//! Per-connection session state.
//!
//! ```text
//! Anonymous --authenticate--> InRoom(default) --join--> InRoom(other) ...
//! ```
//!
//! `Authenticated` without a room only exists between the identity being recorded
//! and the implicit join of the default room.

use super::value_object::{RoomName, Username};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated {
        identity: Username,
    },
    InRoom {
        identity: Username,
        room: RoomName,
    },
}

impl SessionState {
    pub fn identity(&self) -> Option<&Username> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated { identity } | SessionState::InRoom { identity, .. } => {
                Some(identity)
            }
        }
    }

    /// Room the connection is currently a member of
    pub fn current_room(&self) -> Option<&RoomName> {
        match self {
            SessionState::InRoom { room, .. } => Some(room),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}
