//! Configuration management for ZoneGate.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the persisted user file
    pub user_file: PathBuf,
    /// Re-check the user file's mtime on each authentication call
    pub reload_on_change: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimum accepted credential length; shorter codes are rejected
    /// before any lookup
    pub min_code_length: usize,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            store: StoreConfig {
                user_file: PathBuf::from("users.txt"),
                reload_on_change: true,
            },
            policy: PolicyConfig {
                // 32-bit card serials print as 8 hex characters; 6 imposes a
                // floor on PIN strength without excluding short legacy cards.
                min_code_length: 6,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
