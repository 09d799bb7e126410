//! Error types for Husk
//!
//! All modules use `HuskResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Husk operations
pub type HuskResult<T> = Result<T, HuskError>;

/// All errors that can occur in Husk
#[derive(Error, Debug)]
pub enum HuskError {
    // Store errors
    #[error("Cache store '{store}' operation failed: {reason}")]
    Store { store: String, reason: String },

    #[error("Cache store '{store}' IO error: {context}")]
    StoreIo {
        store: String,
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Fetch errors
    #[error("Fetch failed for '{key}': {reason}")]
    Fetch { key: String, reason: String },

    // Manifest errors
    #[error("Deploy manifest not found: {0}")]
    DeployManifestNotFound(PathBuf),

    #[error("Invalid deploy manifest at {path}: {reason}")]
    DeployManifestInvalid { path: PathBuf, reason: String },

    #[error("Request is not tracked by the current manifest: {0}")]
    Untracked(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Unknown configuration key: {0}")]
    ConfigKeyUnknown(String),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl HuskError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store operation error
    pub fn store(store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            reason: reason.into(),
        }
    }

    /// Create a store IO error with context
    pub fn store_io(
        store: impl Into<String>,
        context: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::StoreIo {
            store: store.into(),
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for a resource key
    pub fn fetch(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DeployManifestNotFound(_) => Some("Run: husk manifest gen <assets-dir>"),
            Self::Untracked(_) => Some("Only resources listed in the deploy manifest are cached"),
            _ => None,
        }
    }
}
