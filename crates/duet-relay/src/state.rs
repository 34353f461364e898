//! Shared matchmaking state. Registry, pool and rooms live behind one lock
//! so a participant can never be seen queued and paired at the same time.

use duet_common::Handle;

use crate::pool::WaitingPool;
use crate::registry::Registry;
use crate::rooms::RoomTable;

/// Where a handle currently sits. The three non-absent phases are
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Absent,
    Idle,
    Queued,
    Paired,
}

#[derive(Default)]
pub struct MatchState {
    pub registry: Registry,
    pub pool: WaitingPool,
    pub rooms: RoomTable,
}

impl MatchState {
    pub fn phase(&self, handle: &Handle) -> Phase {
        if self.registry.get(handle).is_none() {
            Phase::Absent
        } else if self.rooms.find(handle).is_some() {
            Phase::Paired
        } else if self.pool.contains(handle) {
            Phase::Queued
        } else {
            Phase::Idle
        }
    }
}

/// Snapshot of the engine counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchStats {
    pub participants: usize,
    pub waiting: usize,
    pub rooms: usize,
}

impl From<&MatchState> for MatchStats {
    fn from(state: &MatchState) -> Self {
        Self {
            participants: state.registry.len(),
            waiting: state.pool.len(),
            rooms: state.rooms.len(),
        }
    }
}
