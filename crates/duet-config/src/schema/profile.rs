use serde::{Deserialize, Serialize};

/// Defaults and limits applied to participant profiles on `join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Assigned names look like `<prefix><0..999>`.
    pub default_name_prefix: String,
    pub default_location: String,
    pub max_name_length: u32,
    pub max_location_length: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_name_prefix: "User".into(),
            default_location: "Unknown".into(),
            max_name_length: 32,
            max_location_length: 64,
        }
    }
}
