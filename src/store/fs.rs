//! Filesystem-backed blob store
//!
//! One directory per named store under a common root. Each entry is a pair
//! of files named by a digest of the resource key: a JSON metadata sidecar
//! and the raw body. The sidecar is written last and removed first, so a
//! torn write or torn delete always reads as a miss, never as a stale or
//! partial entry.

use crate::error::{HuskError, HuskResult};
use crate::manifest::ResourceKey;
use crate::store::{BlobStore, CachedEntry, StoreHandle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Durable [`BlobStore`] rooted at a cache directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn open(&self, name: &str) -> HuskResult<Arc<dyn StoreHandle>> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| HuskError::store_io(name, format!("creating {}", dir.display()), e))?;
        Ok(Arc::new(FsHandle {
            name: name.to_string(),
            dir,
        }))
    }

    async fn delete(&self, name: &str) -> HuskResult<bool> {
        let dir = self.root.join(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!("Deleted store '{}'", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HuskError::store_io(
                name,
                format!("deleting {}", dir.display()),
                e,
            )),
        }
    }
}

/// Metadata sidecar for one stored entry
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: ResourceKey,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

struct FsHandle {
    name: String,
    dir: PathBuf,
}

impl FsHandle {
    /// Entry file stem: hex digest of the key, enough to avoid collisions
    /// while keeping names filesystem-safe regardless of key contents.
    fn stem(key: &ResourceKey) -> String {
        let digest = Sha256::digest(key.as_str().as_bytes());
        hex::encode(&digest[..8])
    }

    fn meta_path(&self, key: &ResourceKey) -> PathBuf {
        self.dir.join(format!("{}.json", Self::stem(key)))
    }

    fn body_path(&self, key: &ResourceKey) -> PathBuf {
        self.dir.join(format!("{}.bin", Self::stem(key)))
    }
}

#[async_trait]
impl StoreHandle for FsHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: &ResourceKey, entry: CachedEntry) -> HuskResult<()> {
        let body_path = self.body_path(key);
        fs::write(&body_path, &entry.body).await.map_err(|e| {
            HuskError::store_io(&self.name, format!("writing body for '{key}'"), e)
        })?;

        let meta = EntryMeta {
            key: key.clone(),
            status: entry.status,
            content_type: entry.content_type,
            stored_at: entry.stored_at,
        };
        let content = serde_json::to_vec(&meta)?;
        // Sidecar last: an entry exists only once its metadata does.
        fs::write(self.meta_path(key), content).await.map_err(|e| {
            HuskError::store_io(&self.name, format!("writing metadata for '{key}'"), e)
        })?;
        Ok(())
    }

    async fn lookup(&self, key: &ResourceKey) -> HuskResult<Option<CachedEntry>> {
        let meta_bytes = match fs::read(self.meta_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(HuskError::store_io(
                    &self.name,
                    format!("reading metadata for '{key}'"),
                    e,
                ));
            }
        };

        let meta: EntryMeta = match serde_json::from_slice(&meta_bytes) {
            Ok(meta) => meta,
            Err(e) => {
                // Unparseable entries read as misses; the caller re-fetches.
                warn!("Discarding unreadable entry for '{}': {}", key, e);
                return Ok(None);
            }
        };

        let body = match fs::read(self.body_path(key)).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Entry body missing for '{}', treating as miss", key);
                return Ok(None);
            }
            Err(e) => {
                return Err(HuskError::store_io(
                    &self.name,
                    format!("reading body for '{key}'"),
                    e,
                ));
            }
        };

        Ok(Some(CachedEntry {
            status: meta.status,
            content_type: meta.content_type,
            stored_at: meta.stored_at,
            body,
        }))
    }

    async fn remove(&self, key: &ResourceKey) -> HuskResult<bool> {
        // Sidecar first: once it is gone the entry reads as absent even if
        // removing the body is interrupted.
        let existed = match fs::remove_file(self.meta_path(key)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(HuskError::store_io(
                    &self.name,
                    format!("removing metadata for '{key}'"),
                    e,
                ));
            }
        };

        match fs::remove_file(self.body_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(HuskError::store_io(
                    &self.name,
                    format!("removing body for '{key}'"),
                    e,
                ));
            }
        }

        Ok(existed)
    }

    async fn keys(&self) -> HuskResult<Vec<ResourceKey>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| HuskError::store_io(&self.name, "listing store directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HuskError::store_io(&self.name, "reading store directory entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match fs::read(&path).await {
                    Ok(bytes) => match serde_json::from_slice::<EntryMeta>(&bytes) {
                        Ok(meta) => keys.push(meta.key),
                        Err(e) => warn!("Skipping unreadable entry {}: {}", path.display(), e),
                    },
                    Err(e) => warn!("Skipping unreadable entry {}: {}", path.display(), e),
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(body: &[u8]) -> CachedEntry {
        CachedEntry::new(200, Some("application/javascript".into()), body.to_vec())
    }

    #[tokio::test]
    async fn put_lookup_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("content").await.unwrap();

        let key = ResourceKey::new("assets/app.js");
        shelf.put(&key, entry(b"console.log(1)")).await.unwrap();

        let found = shelf.lookup(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"console.log(1)");
        assert_eq!(found.content_type.as_deref(), Some("application/javascript"));
    }

    #[tokio::test]
    async fn root_key_is_storable() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("content").await.unwrap();

        let key = ResourceKey::root();
        shelf.put(&key, entry(b"<html>")).await.unwrap();
        assert!(shelf.lookup(&key).await.unwrap().is_some());
        assert_eq!(shelf.keys().await.unwrap(), vec![key]);
    }

    #[tokio::test]
    async fn keys_lists_resident_entries() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("content").await.unwrap();

        shelf.put(&ResourceKey::new("a.js"), entry(b"a")).await.unwrap();
        shelf.put(&ResourceKey::new("b.js"), entry(b"b")).await.unwrap();

        let mut keys = shelf.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec![ResourceKey::new("a.js"), ResourceKey::new("b.js")]);
    }

    #[tokio::test]
    async fn delete_store_removes_directory() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("staging").await.unwrap();
        shelf.put(&ResourceKey::new("a.js"), entry(b"a")).await.unwrap();

        assert!(store.delete("staging").await.unwrap());
        assert!(!dir.path().join("staging").exists());
        assert!(!store.delete("staging").await.unwrap());

        // Reopening yields an empty store.
        let reopened = store.open("staging").await.unwrap();
        assert!(reopened.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_metadata_reads_as_miss() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("content").await.unwrap();

        let key = ResourceKey::new("a.js");
        shelf.put(&key, entry(b"a")).await.unwrap();

        // Clobber the sidecar.
        let stem = hex::encode(&Sha256::digest(key.as_str().as_bytes())[..8]);
        std::fs::write(dir.path().join("content").join(format!("{stem}.json")), b"{").unwrap();

        assert!(shelf.lookup(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_entry() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        let shelf = store.open("content").await.unwrap();

        let key = ResourceKey::new("a.js");
        shelf.put(&key, entry(b"old")).await.unwrap();
        shelf.put(&key, entry(b"new")).await.unwrap();

        let found = shelf.lookup(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(shelf.keys().await.unwrap().len(), 1);
    }
}
