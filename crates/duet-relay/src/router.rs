//! Relay router: room chat fan-out and point-to-point signal forwarding.

use chrono::Utc;
use duet_common::{new_id, Handle};
use serde_json::Value;

use crate::outbox::Outbox;
use crate::protocol::{ChatMessage, MessageKind, ServerEvent, SignalKind};
use crate::state::MatchState;

/// Deliver a chat line to every member of the sender's room, the sender
/// included. Returns false when the sender is not in a room.
pub fn relay_message(
    state: &MatchState,
    outbox: &mut Outbox,
    sender: &Handle,
    content: String,
) -> bool {
    let Some(room) = state.rooms.find(sender) else {
        return false;
    };
    let Some(participant) = state.registry.get(sender) else {
        return false;
    };

    let message = ChatMessage {
        id: new_id(),
        sender_handle: sender.clone(),
        sender_name: participant.display_name.clone(),
        content,
        timestamp: Utc::now(),
        kind: MessageKind::Text,
    };
    for member in &room.members {
        outbox.push(
            &state.registry,
            member,
            ServerEvent::NewMessage(message.clone()),
        );
    }
    true
}

/// Forward an opaque signaling payload to `target`, whether or not the two
/// share a room. Returns false when `target` is not connected.
pub fn relay_signal(
    state: &MatchState,
    outbox: &mut Outbox,
    sender: &Handle,
    target: &Handle,
    kind: SignalKind,
    payload: Value,
) -> bool {
    outbox.push(
        &state.registry,
        target,
        ServerEvent::signal(kind, payload, sender.clone()),
    )
}
