//! Helpers shared by the engine tests.

use duet_common::Handle;
use tokio::sync::mpsc;

use crate::protocol::ServerEvent;
use crate::registry::Profile;
use crate::state::MatchState;

pub fn profile(name: &str) -> Profile {
    Profile {
        display_name: name.into(),
        location: "Unknown".into(),
    }
}

/// Register a fresh participant directly in `state`.
pub fn join(state: &mut MatchState, name: &str) -> (Handle, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let handle = Handle::new();
    state.registry.register(handle.clone(), profile(name), tx);
    (handle, rx)
}

/// Everything currently sitting in an outbox receiver.
pub fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
