//! Configuration schema types for the relay.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod matching;
mod profile;
mod relay;
mod server;

pub use logging::*;
pub use matching::*;
pub use profile::*;
pub use relay::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for `duet-relay`.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DuetConfig {
    pub server: ServerConfig,
    pub matching: MatchingConfig,
    pub profile: ProfileConfig,
    pub relay: RelayConfig,
    pub logging: LoggingConfig,
}
