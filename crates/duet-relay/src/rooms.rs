//! Room table: active two-party rooms, indexed by id and by member handle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use duet_common::{Handle, PairingError, RoomId};

/// A live pairing of exactly two distinct participants.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub members: [Handle; 2],
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// The member that is not `handle`, if `handle` is in this room.
    pub fn partner_of(&self, handle: &Handle) -> Option<&Handle> {
        let [a, b] = &self.members;
        if a == handle {
            Some(b)
        } else if b == handle {
            Some(a)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, Room>,
    by_handle: HashMap<Handle, RoomId>,
}

impl RoomTable {
    /// Pair two handles. Rejected without touching state if either handle is
    /// already in a room or both are the same handle.
    pub fn create(&mut self, a: Handle, b: Handle) -> Result<Room, PairingError> {
        if a == b {
            return Err(PairingError::SelfPairing(a));
        }
        for handle in [&a, &b] {
            if self.by_handle.contains_key(handle) {
                return Err(PairingError::AlreadyPaired(handle.clone()));
            }
        }

        let room = Room {
            id: RoomId::new(),
            members: [a, b],
            created_at: Utc::now(),
        };
        for member in &room.members {
            self.by_handle.insert(member.clone(), room.id.clone());
        }
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    pub fn find(&self, handle: &Handle) -> Option<&Room> {
        self.by_handle
            .get(handle)
            .and_then(|room_id| self.rooms.get(room_id))
    }

    pub fn destroy(&mut self, room_id: &RoomId) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        for member in &room.members {
            self.by_handle.remove(member);
        }
        Some(room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }
}
