use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Process-wide events fanned out to every connection task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Number of registered participants changed.
    OnlineCount(usize),
    /// The server is going down; connections should close.
    Shutdown,
}

/// A lagging subscriber misses older counts, never newer ones.
const DEFAULT_CAPACITY: usize = 64;

/// Broadcast fan-out of [`Event`]s. Sending never blocks and never fails.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers the event reached; zero when nobody
    /// is listening.
    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
