//! Session lifecycle: the `Matchmaker` service that owns all matchmaking
//! state and turns participant requests into state transitions.
//!
//! Every operation takes the write lock once, mutates, and hands its
//! outbound events to the connections before releasing it. Handing off is
//! a `try_send`, so no operation waits on a peer while holding the lock,
//! and each client sees events in the order the state changed. Unknown or
//! stale handles are silent no-ops.

use std::sync::Arc;

use chrono::Utc;
use duet_common::{Event, EventBus, Handle};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use crate::outbox::Outbox;
use crate::pairing;
use crate::protocol::{ServerEvent, SignalKind};
use crate::registry::{Participant, ProfileDefaults};
use crate::rooms::Room;
use crate::router;
use crate::state::{MatchState, MatchStats, Phase};

/// Why a room is being torn down, from the leaving side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Skipped,
    Reported,
    Disconnected,
}

impl Departure {
    /// What the remaining partner is told.
    fn notice(self) -> ServerEvent {
        match self {
            Self::Skipped => ServerEvent::PartnerSkipped,
            Self::Reported => ServerEvent::PartnerReported,
            Self::Disconnected => ServerEvent::PartnerDisconnected,
        }
    }
}

/// Tear down `handle`'s room, if any, and notify the other member.
/// The other member is left idle; it is up to its client to ask again.
fn leave_room(
    state: &mut MatchState,
    outbox: &mut Outbox,
    handle: &Handle,
    departure: Departure,
) -> Option<Room> {
    let room_id = state.rooms.find(handle)?.id.clone();
    let room = state.rooms.destroy(&room_id)?;

    if let Some(partner) = room.partner_of(handle) {
        outbox.push(&state.registry, partner, departure.notice());
    }
    let lasted = (Utc::now() - room.created_at).num_seconds();
    info!(room = %room.id, handle = %handle, ?departure, lasted, "Room closed");
    Some(room)
}

#[derive(Clone)]
pub struct Matchmaker {
    pub(crate) state: Arc<RwLock<MatchState>>,
    events: Arc<EventBus>,
    profiles: Arc<ProfileDefaults>,
}

impl Matchmaker {
    pub fn new(profiles: ProfileDefaults) -> Self {
        Self {
            state: Arc::new(RwLock::new(MatchState::default())),
            events: Arc::new(EventBus::default()),
            profiles: Arc::new(profiles),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register `handle` (or replace its profile). Missing profile fields get
    /// server defaults. Publishes the new online count when the handle is new.
    pub async fn register(
        &self,
        handle: Handle,
        name: Option<String>,
        location: Option<String>,
        outbox: mpsc::Sender<ServerEvent>,
    ) -> Participant {
        let profile = self.profiles.resolve(name, location);
        let participant = {
            let mut state = self.state.write().await;
            let (participant, is_new) = state.registry.register(handle, profile, outbox);
            if is_new {
                self.events.publish(Event::OnlineCount(state.registry.len()));
            }
            participant
        };

        info!(
            handle = %participant.handle,
            name = %participant.display_name,
            location = %participant.location,
            "Participant joined"
        );
        participant
    }

    /// Enter the waiting pool, leaving the current room first if paired,
    /// then try to match. Returns false for an unregistered handle.
    pub async fn request_pairing(&self, handle: &Handle) -> bool {
        let mut state = self.state.write().await;
        let phase = state.phase(handle);
        if phase == Phase::Absent {
            debug!(handle = %handle, "Pairing request from unregistered handle");
            return false;
        }
        debug!(handle = %handle, ?phase, "Pairing requested");

        let mut outbox = Outbox::default();
        leave_room(&mut state, &mut outbox, handle, Departure::Skipped);
        if state.pool.enqueue(handle.clone()) {
            debug!(handle = %handle, waiting = state.pool.len(), "Queued");
        }
        pairing::try_match(&mut state, &mut outbox);
        outbox.dispatch();
        true
    }

    /// Pair whoever is waiting. Used by the periodic sweep.
    pub async fn try_match(&self) -> usize {
        let mut state = self.state.write().await;
        let mut outbox = Outbox::default();
        let matched = pairing::try_match(&mut state, &mut outbox);
        outbox.dispatch();
        matched
    }

    /// Relay a chat line to the sender's room. Returns whether it was delivered.
    pub async fn relay_message(&self, sender: &Handle, content: String) -> bool {
        let delivered = {
            // Write lock: concurrent chat lines from both members must land in
            // both outboxes in the same order.
            let state = self.state.write().await;
            let mut outbox = Outbox::default();
            let delivered = router::relay_message(&state, &mut outbox, sender, content);
            outbox.dispatch();
            delivered
        };
        if !delivered {
            debug!(handle = %sender, "Message from unpaired handle dropped");
        }
        delivered
    }

    /// Forward a signaling payload to `target`. Returns whether it was delivered.
    pub async fn relay_signal(
        &self,
        sender: &Handle,
        target: &Handle,
        kind: SignalKind,
        payload: Value,
    ) -> bool {
        let delivered = {
            let state = self.state.write().await;
            let mut outbox = Outbox::default();
            let delivered = router::relay_signal(&state, &mut outbox, sender, target, kind, payload);
            outbox.dispatch();
            delivered
        };
        if !delivered {
            debug!(handle = %sender, target = %target, ?kind, "Signal to unknown target dropped");
        }
        delivered
    }

    /// Leave the current room; the partner is told they were skipped.
    /// The skipper is not re-queued.
    pub async fn skip(&self, handle: &Handle) -> bool {
        self.depart(handle, Departure::Skipped).await.is_some()
    }

    /// Leave the current room; the partner is told they were reported.
    pub async fn report(&self, handle: &Handle, reason: Option<String>) -> bool {
        let Some(room) = self.depart(handle, Departure::Reported).await else {
            return false;
        };
        let reported = room.partner_of(handle).map(ToString::to_string);
        info!(
            reporter = %handle,
            reported = reported.as_deref().unwrap_or("?"),
            reason = reason.as_deref().unwrap_or(""),
            "Partner reported"
        );
        true
    }

    /// Tell the partner they were liked. No-op when not paired.
    pub async fn like(&self, handle: &Handle) -> bool {
        let state = self.state.write().await;
        let Some(room) = state.rooms.find(handle) else {
            return false;
        };
        let (Some(partner), Some(from)) =
            (room.partner_of(handle), state.registry.get(handle).cloned())
        else {
            return false;
        };

        let mut outbox = Outbox::default();
        let delivered = outbox.push(&state.registry, partner, ServerEvent::PartnerLiked { from });
        outbox.dispatch();
        delivered
    }

    /// Full teardown after transport loss. Safe to call any number of times.
    /// Returns true if the handle was still registered.
    pub async fn disconnect(&self, handle: &Handle) -> bool {
        let removed = {
            let mut state = self.state.write().await;
            let mut outbox = Outbox::default();
            state.pool.remove(handle);
            leave_room(&mut state, &mut outbox, handle, Departure::Disconnected);
            outbox.dispatch();

            let removed = state.registry.remove(handle).is_some();
            if removed {
                self.events.publish(Event::OnlineCount(state.registry.len()));
            }
            removed
        };

        if removed {
            info!(handle = %handle, "Participant left");
        }
        removed
    }

    #[cfg(test)]
    pub async fn phase(&self, handle: &Handle) -> Phase {
        self.state.read().await.phase(handle)
    }

    pub async fn stats(&self) -> MatchStats {
        MatchStats::from(&*self.state.read().await)
    }

    /// Ask every connection and the sweeper to stop.
    pub fn shutdown(&self) {
        let receivers = self.events.publish(Event::Shutdown);
        info!(receivers, "Shutdown requested");
    }

    async fn depart(&self, handle: &Handle, departure: Departure) -> Option<Room> {
        let mut state = self.state.write().await;
        let mut outbox = Outbox::default();
        let room = leave_room(&mut state, &mut outbox, handle, departure);
        outbox.dispatch();
        room
    }
}
