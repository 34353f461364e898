//! Reading a `DuetConfig` from disk.

use std::io::ErrorKind;
use std::path::Path;

use duet_common::ConfigError;
use tracing::{debug, info, warn};

use super::paths::{create_default_config, default_config_path};
use crate::schema::DuetConfig;
use crate::validation;

/// Parse the TOML file at `path`. Absent keys fall back to their defaults.
///
/// Out-of-range values are only logged here; `load_config` rejects them.
pub fn load_from_path(path: &Path) -> Result<DuetConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config = parse(&content)?;
    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "Config has out-of-range values: {e}");
    }

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Load `default_config_path()`, seeding it with the commented template on
/// first run.
pub fn load_default() -> Result<DuetConfig, ConfigError> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "No config file yet");
        create_default_config(&path)?;
        return Ok(DuetConfig::default());
    }
    load_from_path(&path)
}

fn parse(content: &str) -> Result<DuetConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("invalid TOML: {e}")))
}
