//! Persisted user settings.
//!
//! Stored as JSON under the user config directory
//! (`~/.config/callkeep/config.json` on Linux). Loading is fail-soft: a
//! missing or unreadable settings file yields defaults so the CLI can always
//! start and guide the user through configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ApiConfig;

/// Persisted settings for the local agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Identifier of the recording agent, attached to every saved record
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Directory where tagged recordings are moved (None = default data dir)
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,

    /// Backend endpoints and network tuning
    #[serde(default)]
    pub api: ApiConfig,
}

impl Settings {
    /// Load settings from disk, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                crate::verbose!("Ignoring unparsable settings file {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to disk, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path().context("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Path of the settings file, if a config directory exists on this system.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("callkeep").join("config.json"))
    }

    /// Directory where tagged recordings live.
    pub fn recordings_dir(&self) -> PathBuf {
        self.recordings_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("callkeep")
                .join("recordings")
        })
    }

    /// Path of the persisted ledger blob.
    pub fn ledger_path(&self) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("callkeep")
            .join("recordings.json")
    }
}
