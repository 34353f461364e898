//! Pairing engine: turns the two oldest waiting participants into a room,
//! on demand and from a periodic sweep.

use std::time::Duration;

use duet_common::Event;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::lifecycle::Matchmaker;
use crate::outbox::Outbox;
use crate::protocol::ServerEvent;
use crate::state::MatchState;

/// Pair waiting participants front-to-back until fewer than two remain.
///
/// Entries whose connection has gone away are dropped. A live entry whose
/// partner turned out to be dead goes back to the head of the pool.
/// Returns the number of rooms created.
pub fn try_match(state: &mut MatchState, outbox: &mut Outbox) -> usize {
    let mut matched = 0;

    while state.pool.len() >= 2 {
        let (Some(a), Some(b)) = (state.pool.dequeue_front(), state.pool.dequeue_front()) else {
            break;
        };

        match (state.registry.is_live(&a), state.registry.is_live(&b)) {
            (true, true) => {}
            (true, false) => {
                debug!(handle = %b, "Dropping dead pool entry");
                state.pool.push_front(a);
                continue;
            }
            (false, true) => {
                debug!(handle = %a, "Dropping dead pool entry");
                state.pool.push_front(b);
                continue;
            }
            (false, false) => {
                debug!(a = %a, b = %b, "Dropping dead pool entries");
                continue;
            }
        }

        let room = match state.rooms.create(a.clone(), b.clone()) {
            Ok(room) => room,
            Err(e) => {
                error!(error = %e, "Refusing to pair");
                for handle in [b, a] {
                    if state.rooms.find(&handle).is_none() {
                        state.pool.push_front(handle);
                    }
                }
                continue;
            }
        };

        let [first, second] = &room.members;
        for (me, other) in [(first, second), (second, first)] {
            if let Some(partner) = state.registry.get(other).cloned() {
                outbox.push(
                    &state.registry,
                    me,
                    ServerEvent::PartnerFound {
                        partner,
                        room_id: room.id.clone(),
                    },
                );
            }
        }

        info!(room = %room.id, a = %first, b = %second, "Matched");
        matched += 1;
    }

    matched
}

/// Run `Matchmaker::try_match` every `every` until shutdown, logging the
/// engine counters every `stats_every`.
pub fn spawn_sweeper(matchmaker: Matchmaker, every: Duration, stats_every: Duration) -> JoinHandle<()> {
    let mut events = matchmaker.events().subscribe();

    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(every);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = tokio::time::interval(stats_every);
        stats.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    let matched = matchmaker.try_match().await;
                    if matched > 0 {
                        debug!(matched, "Sweep matched pairs");
                    }
                }
                _ = stats.tick() => {
                    let stats = matchmaker.stats().await;
                    debug!(
                        participants = stats.participants,
                        waiting = stats.waiting,
                        rooms = stats.rooms,
                        "Sweep tick"
                    );
                }
                event = events.recv() => match event {
                    Ok(Event::Shutdown) | Err(RecvError::Closed) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                },
            }
        }

        debug!("Sweeper stopped");
    })
}
