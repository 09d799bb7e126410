//! Previous-manifest persistence
//!
//! The manifest store holds exactly one record: the resource table of the
//! last successfully activated build, serialized as JSON under a fixed key.
//! It is the only durable state carried across activations.

use crate::error::HuskResult;
use crate::manifest::{ResourceKey, ResourceManifest};
use crate::store::{BlobStore, CachedEntry, StoreHandle};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed record key for the persisted manifest
const RECORD_KEY: &str = "manifest";

/// The persisted previous-build manifest with its write timestamp
#[derive(Debug, Clone)]
pub struct ManifestRecord {
    pub manifest: ResourceManifest,
    pub stored_at: DateTime<Utc>,
}

/// Reads and replaces the persisted previous manifest
pub struct ManifestRegistry {
    store: Arc<dyn BlobStore>,
    store_name: String,
}

impl ManifestRegistry {
    pub fn new(store: Arc<dyn BlobStore>, store_name: impl Into<String>) -> Self {
        Self {
            store,
            store_name: store_name.into(),
        }
    }

    /// Load the persisted record, if any.
    ///
    /// An unparseable record is indistinguishable from corruption and reads
    /// as absent, which sends the next activation down the cold path.
    pub async fn load_record(&self) -> HuskResult<Option<ManifestRecord>> {
        let shelf = self.store.open(&self.store_name).await?;
        let Some(entry) = shelf.lookup(&ResourceKey::new(RECORD_KEY)).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<ResourceManifest>(&entry.body) {
            Ok(manifest) => Ok(Some(ManifestRecord {
                manifest,
                stored_at: entry.stored_at,
            })),
            Err(e) => {
                warn!("Persisted manifest is unreadable, treating as absent: {e}");
                Ok(None)
            }
        }
    }

    /// Load just the previous manifest, if any
    pub async fn load_previous(&self) -> HuskResult<Option<ResourceManifest>> {
        Ok(self.load_record().await?.map(|record| record.manifest))
    }

    /// Replace the persisted manifest with the given one.
    ///
    /// Full replacement, never a merge.
    pub async fn replace(&self, current: &ResourceManifest) -> HuskResult<()> {
        let body = serde_json::to_vec(current)?;
        let shelf = self.store.open(&self.store_name).await?;
        shelf
            .put(
                &ResourceKey::new(RECORD_KEY),
                CachedEntry::new(200, Some("application/json".to_string()), body),
            )
            .await?;
        debug!(
            "Persisted manifest with {} resources to '{}'",
            current.len(),
            self.store_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Fingerprint;
    use crate::store::MemoryStore;

    fn manifest() -> ResourceManifest {
        [
            (ResourceKey::new("a.js"), Fingerprint::new("h1")),
            (ResourceKey::new("b.js"), Fingerprint::new("h2")),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn absent_on_fresh_store() {
        let registry = ManifestRegistry::new(Arc::new(MemoryStore::new()), "manifest");
        assert!(registry.load_previous().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_then_load() {
        let registry = ManifestRegistry::new(Arc::new(MemoryStore::new()), "manifest");
        registry.replace(&manifest()).await.unwrap();

        let loaded = registry.load_previous().await.unwrap().unwrap();
        assert_eq!(loaded, manifest());
    }

    #[tokio::test]
    async fn replace_overwrites_fully() {
        let registry = ManifestRegistry::new(Arc::new(MemoryStore::new()), "manifest");
        registry.replace(&manifest()).await.unwrap();

        let next: ResourceManifest = [(ResourceKey::new("c.js"), Fingerprint::new("h3"))]
            .into_iter()
            .collect();
        registry.replace(&next).await.unwrap();

        let loaded = registry.load_previous().await.unwrap().unwrap();
        assert_eq!(loaded, next);
        assert!(!loaded.contains(&ResourceKey::new("a.js")));
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        let shelf = store.open("manifest").await.unwrap();
        shelf
            .put(
                &ResourceKey::new(RECORD_KEY),
                CachedEntry::new(200, None, b"not json".to_vec()),
            )
            .await
            .unwrap();

        let registry = ManifestRegistry::new(store, "manifest");
        assert!(registry.load_previous().await.unwrap().is_none());
    }
}
