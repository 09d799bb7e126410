//! Configuration management for Husk

pub mod schema;

pub use schema::{Config, StoreNames};

use crate::error::{HuskError, HuskResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local configuration file name
const LOCAL_CONFIG_NAME: &str = ".husk.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("husk")
            .join("config.toml")
    }

    /// Default root directory for filesystem stores
    pub fn stores_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("husk")
            .join("stores")
    }

    /// Find a project-local `.husk.toml`, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, using defaults if not exists
    pub async fn load(&self) -> HuskResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> HuskResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| HuskError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| HuskError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the global configuration with an optional project-local
    /// overlay merged on top. Local values win per key.
    pub async fn load_merged(&self, local: Option<&Path>) -> HuskResult<Config> {
        let mut merged = self.load_value(&self.config_path).await?;

        if let Some(local) = local {
            debug!("Merging local config from {}", local.display());
            merge_values(&mut merged, self.load_value(local).await?);
        }

        merged.try_into().map_err(|e: toml::de::Error| {
            HuskError::ConfigInvalid {
                path: self.config_path.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// Read a file as a raw TOML table, treating a missing file as empty
    async fn load_value(&self, path: &Path) -> HuskResult<toml::Value> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(HuskError::io(
                    format!("reading config from {}", path.display()),
                    e,
                ));
            }
        };

        content.parse().map_err(|e: toml::de::Error| {
            HuskError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> HuskResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            HuskError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Set one `table.field` value in place, preserving file formatting
    pub async fn set_value(&self, key: &str, value: &str) -> HuskResult<()> {
        let (table, field) = key
            .split_once('.')
            .ok_or_else(|| HuskError::ConfigKeyUnknown(key.to_string()))?;
        if !matches!(table, "general" | "stores" | "origin") {
            return Err(HuskError::ConfigKeyUnknown(key.to_string()));
        }

        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(HuskError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ));
            }
        };

        let mut doc: toml_edit::DocumentMut =
            content.parse().map_err(|e: toml_edit::TomlError| {
                HuskError::ConfigInvalid {
                    path: self.config_path.clone(),
                    reason: e.to_string(),
                }
            })?;

        // Typed where the value parses as such, string otherwise.
        let item = if let Ok(b) = value.parse::<bool>() {
            toml_edit::value(b)
        } else if let Ok(i) = value.parse::<i64>() {
            toml_edit::value(i)
        } else {
            toml_edit::value(value)
        };

        doc.entry(table)
            .or_insert(toml_edit::Item::Table(toml_edit::Table::new()))
            .as_table_mut()
            .ok_or_else(|| HuskError::ConfigKeyUnknown(key.to_string()))?
            .insert(field, item);

        // Reject edits that break the schema before writing them out.
        toml::from_str::<Config>(&doc.to_string()).map_err(|e| HuskError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;

        self.ensure_config_dir().await?;
        fs::write(&self.config_path, doc.to_string())
            .await
            .map_err(|e| {
                HuskError::io(
                    format!("writing config to {}", self.config_path.display()),
                    e,
                )
            })?;

        info!("Set {} = {}", key, value);
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> HuskResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| HuskError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively overlay `overlay` onto `base`; overlay values win
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nonexistent.toml"));

        let config = manager.load().await.unwrap();
        assert_eq!(config.stores.content, "husk-content");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let mut config = Config::default();
        config.origin.url = Some("https://app.example.com".to_string());

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.origin.url.as_deref(), Some("https://app.example.com"));
    }

    #[tokio::test]
    async fn merged_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        let local = temp.path().join(".husk.toml");

        tokio::fs::write(
            &global,
            "[origin]\nurl = \"https://global.example\"\n[stores]\ncontent = \"global-content\"\n",
        )
        .await
        .unwrap();
        tokio::fs::write(&local, "[origin]\nurl = \"https://local.example\"\n")
            .await
            .unwrap();

        let manager = ConfigManager::with_path(global);
        let config = manager.load_merged(Some(&local)).await.unwrap();

        assert_eq!(config.origin.url.as_deref(), Some("https://local.example"));
        // Keys the local file does not set are kept from the global one.
        assert_eq!(config.stores.content, "global-content");
    }

    #[tokio::test]
    async fn set_value_creates_and_updates() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        manager
            .set_value("origin.url", "https://app.example.com")
            .await
            .unwrap();
        manager.set_value("general.verbose", "true").await.unwrap();

        let config = manager.load().await.unwrap();
        assert_eq!(config.origin.url.as_deref(), Some("https://app.example.com"));
        assert!(config.general.verbose);
    }

    #[tokio::test]
    async fn set_value_rejects_unknown_table() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let result = manager.set_value("bogus.key", "x").await;
        assert!(matches!(result, Err(HuskError::ConfigKeyUnknown(_))));

        let result = manager.set_value("noDot", "x").await;
        assert!(matches!(result, Err(HuskError::ConfigKeyUnknown(_))));
    }

    #[test]
    fn find_local_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(".husk.toml"), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(".husk.toml"));
    }
}
