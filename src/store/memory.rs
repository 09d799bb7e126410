//! In-process blob store
//!
//! Keeps every named store in a shared map guarded by an async RwLock.
//! Used by tests and by embedders that bring their own persistence.

use crate::error::HuskResult;
use crate::manifest::ResourceKey;
use crate::store::{BlobStore, CachedEntry, StoreHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Shelf = HashMap<ResourceKey, CachedEntry>;
type Stores = Arc<RwLock<HashMap<String, Shelf>>>;

/// In-memory [`BlobStore`] implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stores: Stores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn open(&self, name: &str) -> HuskResult<Arc<dyn StoreHandle>> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(Arc::new(MemoryHandle {
            name: name.to_string(),
            stores: Arc::clone(&self.stores),
        }))
    }

    async fn delete(&self, name: &str) -> HuskResult<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }
}

struct MemoryHandle {
    name: String,
    stores: Stores,
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, key: &ResourceKey, entry: CachedEntry) -> HuskResult<()> {
        // Re-creates the store if it was deleted after this handle was
        // opened, matching open-by-name semantics.
        self.stores
            .write()
            .await
            .entry(self.name.clone())
            .or_default()
            .insert(key.clone(), entry);
        Ok(())
    }

    async fn lookup(&self, key: &ResourceKey) -> HuskResult<Option<CachedEntry>> {
        Ok(self
            .stores
            .read()
            .await
            .get(&self.name)
            .and_then(|shelf| shelf.get(key))
            .cloned())
    }

    async fn remove(&self, key: &ResourceKey) -> HuskResult<bool> {
        Ok(self
            .stores
            .write()
            .await
            .get_mut(&self.name)
            .is_some_and(|shelf| shelf.remove(key).is_some()))
    }

    async fn keys(&self) -> HuskResult<Vec<ResourceKey>> {
        Ok(self
            .stores
            .read()
            .await
            .get(&self.name)
            .map(|shelf| shelf.keys().cloned().collect())
            .unwrap_or_default())
    }
}
