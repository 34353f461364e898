use serde::{Deserialize, Serialize};

/// Chat and signal relay limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Longest chat message accepted, in characters.
    pub max_message_length: u32,
    /// Sustained chat + signal frames a connection may relay per second.
    pub rate_per_sec: u32,
    /// Frames a connection may relay in a burst above the sustained rate.
    pub burst: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            rate_per_sec: 20,
            burst: 60,
        }
    }
}
