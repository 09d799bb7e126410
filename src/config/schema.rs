//! Configuration schema for Husk
//!
//! Configuration is stored at `~/.config/husk/config.toml`, optionally
//! overridden per project by a `.husk.toml` file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache store settings
    pub stores: StoreConfig,

    /// Origin settings
    pub origin: OriginConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// The three logical store names used by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    /// Durable store that serves fetches
    pub content: String,
    /// Transient store populated during install
    pub staging: String,
    /// Durable store holding the previous-build manifest record
    pub manifest: String,
}

/// Cache store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory for filesystem stores (defaults to the platform
    /// data directory)
    pub root: Option<PathBuf>,

    /// Content store name
    pub content: String,

    /// Staging store name
    pub staging: String,

    /// Manifest store name
    pub manifest: String,
}

impl StoreConfig {
    /// The configured logical store names
    pub fn names(&self) -> StoreNames {
        StoreNames {
            content: self.content.clone(),
            staging: self.staging.clone(),
            manifest: self.manifest.clone(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            content: "husk-content".to_string(),
            staging: "husk-staging".to_string(),
            manifest: "husk-manifest".to_string(),
        }
    }
}

/// Origin configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin URL or deploy directory to resolve resources against
    pub url: Option<String>,

    /// Path to the deploy manifest JSON (defaults to `husk.json` next to
    /// the origin)
    pub deploy_manifest: Option<PathBuf>,
}
