use serde::{Deserialize, Serialize};

/// Pairing sweep and delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Interval of the periodic matching sweep, in milliseconds.
    pub sweep_interval_ms: u32,
    /// Outbound events buffered per connection before new ones are dropped.
    pub outbox_capacity: u32,
    /// How often the sweep task logs pool/room counters, in seconds.
    pub stats_interval_secs: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1000,
            outbox_capacity: 256,
            stats_interval_secs: 60,
        }
    }
}
