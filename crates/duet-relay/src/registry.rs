//! Participant registry: the single owner of every connected participant's
//! profile and outbox. Other components refer to participants by handle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use duet_common::Handle;
use duet_config::schema::ProfileConfig;
use rand::Rng;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::protocol::ServerEvent;

/// Public profile of a connected participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub handle: Handle,
    pub display_name: String,
    pub location: String,
    pub joined_at: DateTime<Utc>,
}

/// Profile fields after defaults and limits have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub display_name: String,
    pub location: String,
}

/// Fills in server-assigned defaults for whatever a `join` left out.
#[derive(Debug, Clone)]
pub struct ProfileDefaults {
    name_prefix: String,
    location: String,
    max_name_length: usize,
    max_location_length: usize,
}

impl ProfileDefaults {
    pub fn resolve(&self, name: Option<String>, location: Option<String>) -> Profile {
        let display_name = clean(name, self.max_name_length).unwrap_or_else(|| {
            let n: u32 = rand::thread_rng().gen_range(0..1000);
            format!("{}{n}", self.name_prefix)
        });
        let location =
            clean(location, self.max_location_length).unwrap_or_else(|| self.location.clone());
        Profile {
            display_name,
            location,
        }
    }
}

impl From<&ProfileConfig> for ProfileDefaults {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            name_prefix: config.default_name_prefix.clone(),
            location: config.default_location.clone(),
            max_name_length: config.max_name_length as usize,
            max_location_length: config.max_location_length as usize,
        }
    }
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self::from(&ProfileConfig::default())
    }
}

/// Trim, treat blank as absent, cap at `max` characters.
fn clean(value: Option<String>, max: usize) -> Option<String> {
    let trimmed = value?.trim().to_string();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max).collect())
}

struct Entry {
    participant: Participant,
    outbox: mpsc::Sender<ServerEvent>,
}

#[derive(Default)]
pub struct Registry {
    entries: HashMap<Handle, Entry>,
}

impl Registry {
    /// Register or re-register a handle. Re-registering replaces the profile
    /// and outbox but keeps the original join time. Returns the stored
    /// participant and whether the handle is new.
    pub fn register(
        &mut self,
        handle: Handle,
        profile: Profile,
        outbox: mpsc::Sender<ServerEvent>,
    ) -> (Participant, bool) {
        let joined_at = self
            .entries
            .get(&handle)
            .map(|e| e.participant.joined_at)
            .unwrap_or_else(Utc::now);
        let is_new = !self.entries.contains_key(&handle);

        let participant = Participant {
            handle: handle.clone(),
            display_name: profile.display_name,
            location: profile.location,
            joined_at,
        };
        self.entries.insert(
            handle,
            Entry {
                participant: participant.clone(),
                outbox,
            },
        );
        (participant, is_new)
    }

    pub fn get(&self, handle: &Handle) -> Option<&Participant> {
        self.entries.get(handle).map(|e| &e.participant)
    }

    pub fn outbox(&self, handle: &Handle) -> Option<&mpsc::Sender<ServerEvent>> {
        self.entries.get(handle).map(|e| &e.outbox)
    }

    /// Registered and its connection task is still reading the outbox.
    pub fn is_live(&self, handle: &Handle) -> bool {
        self.entries
            .get(handle)
            .is_some_and(|e| !e.outbox.is_closed())
    }

    pub fn remove(&mut self, handle: &Handle) -> Option<Participant> {
        self.entries.remove(handle).map(|e| e.participant)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
