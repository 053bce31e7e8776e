//! In-memory registry of live rooms and their member connections.
//!
//! A room entry is created lazily on first join or create and is never removed,
//! even when its member set becomes empty. The default room is present from the start.

use std::collections::{HashMap, HashSet};

use super::value_object::{ConnectionId, DEFAULT_ROOM_NAME, RoomName};

/// Live rooms keyed by canonical name
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    /// Create a registry holding only the (empty) default room
    pub fn new() -> Self {
        let mut rooms = HashMap::new();
        rooms.insert(DEFAULT_ROOM_NAME.to_string(), HashSet::new());
        Self { rooms }
    }

    /// Create an empty entry for `room` if it does not exist yet.
    pub fn ensure_room(&mut self, room: &RoomName) {
        self.rooms.entry(room.as_str().to_string()).or_default();
    }

    /// Add a connection to a room, creating the room entry if missing.
    pub fn add_member(&mut self, room: &RoomName, connection_id: ConnectionId) {
        self.rooms
            .entry(room.as_str().to_string())
            .or_default()
            .insert(connection_id);
    }

    /// Remove a connection from a room. Absent rooms or members are ignored.
    ///
    /// The room entry stays in place even when it ends up empty.
    pub fn remove_member(&mut self, room: &RoomName, connection_id: &ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room.as_str()) {
            members.remove(connection_id);
        }
    }

    /// Snapshot of the connections currently in `room` (empty if unknown)
    pub fn members_of(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms
            .get(room.as_str())
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `room` has a live entry
    pub fn contains(&self, room: &RoomName) -> bool {
        self.rooms.contains_key(room.as_str())
    }

    /// Canonical names of every live room, regardless of member count
    pub fn live_room_names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    /// Number of rooms `connection_id` currently belongs to.
    pub fn membership_count(&self, connection_id: &ConnectionId) -> usize {
        self.rooms
            .values()
            .filter(|members| members.contains(connection_id))
            .count()
    }
}
