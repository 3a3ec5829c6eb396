//! Configuration schema for pgdrop
//!
//! Configuration is stored at `~/.config/pgdrop/config.toml`. Only the
//! command-line surface reads it; the drop operations take no settings.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// OS page cache drop settings
    pub system_cache: SystemCacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// OS page cache drop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemCacheConfig {
    /// Ask before dropping the machine-wide cache
    pub confirm: bool,
}

impl Default for SystemCacheConfig {
    fn default() -> Self {
        Self { confirm: true }
    }
}
