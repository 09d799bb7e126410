//! Named blob stores for cached response payloads
//!
//! A [`BlobStore`] hands out [`StoreHandle`]s by name, creating stores on
//! demand; deleting a store discards everything in it. Husk uses three
//! logical stores: the durable content store that serves fetches, the
//! transient staging store populated during install, and the manifest store
//! holding the persisted previous-build manifest.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::HuskResult;
use crate::manifest::ResourceKey;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A stored response payload
#[derive(Debug, Clone)]
pub struct CachedEntry {
    /// HTTP status the payload was fetched with
    pub status: u16,

    /// Content type reported by the origin, if any
    pub content_type: Option<String>,

    /// When the entry was written
    pub stored_at: DateTime<Utc>,

    /// Response body bytes
    pub body: Vec<u8>,
}

impl CachedEntry {
    /// Create a new entry stamped with the current time
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            stored_at: Utc::now(),
            body,
        }
    }
}

/// Factory for named stores
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a named store, creating it if absent
    async fn open(&self, name: &str) -> HuskResult<Arc<dyn StoreHandle>>;

    /// Delete a named store and everything in it. Returns whether it existed.
    async fn delete(&self, name: &str) -> HuskResult<bool>;
}

/// Operations on one named store
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// The store's name
    fn name(&self) -> &str;

    /// Write an entry, replacing any existing one for the key
    async fn put(&self, key: &ResourceKey, entry: CachedEntry) -> HuskResult<()>;

    /// Look up an entry by key
    async fn lookup(&self, key: &ResourceKey) -> HuskResult<Option<CachedEntry>>;

    /// Remove an entry. Returns whether it existed.
    async fn remove(&self, key: &ResourceKey) -> HuskResult<bool>;

    /// List all resident keys
    async fn keys(&self) -> HuskResult<Vec<ResourceKey>>;
}
