//! Resource manifests and request-key normalization
//!
//! A manifest maps normalized resource keys to content fingerprints for one
//! deployed build. Two manifests exist at runtime: the `current` one shipped
//! with the build, and the `previous` one persisted by the last successful
//! activation (see [`registry`]).

pub mod generate;
pub mod registry;

pub use generate::scan_assets;
pub use registry::ManifestRegistry;

use crate::error::{HuskError, HuskResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Sentinel key for the entry document
const ROOT_KEY: &str = "/";

/// Normalized origin-relative path identifying a trackable asset
///
/// Keys carry no leading slash except the root sentinel `"/"`, which stands
/// for the entry document. Normalization happens once, at the request
/// boundary, so the router and the reconciliation engine always agree on
/// key format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Wrap an already-normalized key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The entry-document sentinel key
    pub fn root() -> Self {
        Self(ROOT_KEY.to_string())
    }

    /// Whether this is the entry-document key
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalize a request URL against the configured origin.
    ///
    /// Returns `None` for URLs on a different origin; those requests are
    /// not ours to handle. Accepts bare origin-relative paths as well, so
    /// callers may pass either `https://app.example/main.js` or `main.js`.
    ///
    /// Rules: the origin prefix is stripped; an empty, root, or
    /// fragment-only remainder maps to `"/"`; a `?v=` cache-buster suffix
    /// is stripped before lookup.
    pub fn from_request(url: &str, origin: &str) -> Option<Self> {
        let origin = origin.trim_end_matches('/');

        let key = if let Some(rest) = url.strip_prefix(origin) {
            // Guard against prefix collisions between origins
            // (e.g. https://app.com matching https://app.community).
            if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('#')) {
                return None;
            }
            rest.trim_start_matches('/')
        } else if url.contains("://") {
            // Different origin entirely.
            return None;
        } else {
            url.trim_start_matches('/')
        };

        let key = match key.find("?v=") {
            Some(idx) => &key[..idx],
            None => key,
        };

        if key.is_empty() || key.starts_with('#') {
            return Some(Self::root());
        }
        Some(Self(key.to_string()))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content hash used to detect whether a resource's bytes changed between
/// builds. Opaque; only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full key → fingerprint table for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest(BTreeMap<ResourceKey, Fingerprint>);

impl ResourceManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ResourceKey, fingerprint: Fingerprint) {
        self.0.insert(key, fingerprint);
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Fingerprint> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &Fingerprint)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ResourceKey, Fingerprint)> for ResourceManifest {
    fn from_iter<I: IntoIterator<Item = (ResourceKey, Fingerprint)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build-time input for one deployed build: the resource table plus the
/// application-shell core set staged before activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployManifest {
    /// Resource key → content fingerprint for every trackable asset
    pub resources: ResourceManifest,

    /// Application shell files downloaded before the worker may activate
    pub core: Vec<ResourceKey>,
}

impl DeployManifest {
    /// Load and validate a deploy manifest from a JSON file
    pub async fn load(path: &Path) -> HuskResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HuskError::DeployManifestNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(HuskError::io(
                    format!("reading deploy manifest {}", path.display()),
                    e,
                ));
            }
        };

        let manifest: Self =
            serde_json::from_str(&content).map_err(|e| HuskError::DeployManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    /// Save a deploy manifest as pretty-printed JSON
    pub async fn save(&self, path: &Path) -> HuskResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await.map_err(|e| {
            HuskError::io(format!("writing deploy manifest {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Every core key must be a tracked resource.
    fn validate(&self, path: &Path) -> HuskResult<()> {
        for key in &self.core {
            if !self.resources.contains(key) {
                return Err(HuskError::DeployManifestInvalid {
                    path: path.to_path_buf(),
                    reason: format!("core entry '{key}' is not listed in resources"),
                });
            }
        }
        Ok(())
    }
}
