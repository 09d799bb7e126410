//! Request routing
//!
//! Classifies incoming requests against the current manifest and serves
//! them with one of two policies: cache-first for static resources, and
//! online-first for the entry document, the one resource whose freshness
//! decides which build a client loads next. Anything the manifest does not
//! track is passed through untouched.

use crate::config::StoreNames;
use crate::error::HuskResult;
use crate::fetch::{AssetFetcher, FetchMode, FetchResponse};
use crate::manifest::{ResourceKey, ResourceManifest};
use crate::store::{BlobStore, StoreHandle};
use std::sync::Arc;
use tracing::{debug, warn};

/// An incoming request
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
}

impl AssetRequest {
    /// A GET request for a URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }
}

/// How a request will be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Not ours; the host forwards it to the network untouched
    Passthrough,
    /// Entry document: network first, cache fallback
    OnlineFirst(ResourceKey),
    /// Tracked static resource: cache hit or lazily populated fetch
    CacheFirst(ResourceKey),
}

/// Serves requests from the content store
pub struct Router {
    content_store: String,
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn AssetFetcher>,
    manifest: ResourceManifest,
}

impl Router {
    pub fn new(
        names: &StoreNames,
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn AssetFetcher>,
        manifest: ResourceManifest,
    ) -> Self {
        Self {
            content_store: names.content.clone(),
            store,
            fetcher,
            manifest,
        }
    }

    /// Classify a request without touching the cache
    pub fn classify(&self, request: &AssetRequest) -> Route {
        if !request.method.eq_ignore_ascii_case("GET") {
            return Route::Passthrough;
        }

        let Some(key) = ResourceKey::from_request(&request.url, self.fetcher.origin()) else {
            return Route::Passthrough;
        };
        if !self.manifest.contains(&key) {
            return Route::Passthrough;
        }

        if key.is_root() {
            Route::OnlineFirst(key)
        } else {
            Route::CacheFirst(key)
        }
    }

    /// Handle a request. `Ok(None)` means pass through to the network.
    pub async fn handle(&self, request: &AssetRequest) -> HuskResult<Option<FetchResponse>> {
        match self.classify(request) {
            Route::Passthrough => {
                debug!("Passing through {} {}", request.method, request.url);
                Ok(None)
            }
            Route::OnlineFirst(key) => self.online_first(&key).await.map(Some),
            Route::CacheFirst(key) => self.cache_first(&key).await.map(Some),
        }
    }

    /// Cache hit, or fetch and lazily populate. Population is best-effort:
    /// only ok responses are stored, and a failed write never fails the
    /// response.
    async fn cache_first(&self, key: &ResourceKey) -> HuskResult<FetchResponse> {
        let cache = self.store.open(&self.content_store).await?;

        if let Some(entry) = cache.lookup(key).await? {
            debug!("Cache hit for '{}'", key);
            return Ok(entry.into());
        }

        debug!("Cache miss for '{}', fetching", key);
        let response = self.fetcher.fetch(key, FetchMode::Default).await?;
        if response.is_ok() {
            if let Err(err) = cache.put(key, response.clone().into_entry()).await {
                warn!("Could not cache '{}': {}", key, err);
            }
        }
        Ok(response)
    }

    /// Network first; fall back to the cached entry only when the origin
    /// is unreachable. With neither, the original network failure
    /// propagates, since there is no synthetic offline page.
    async fn online_first(&self, key: &ResourceKey) -> HuskResult<FetchResponse> {
        match self.fetcher.fetch(key, FetchMode::Default).await {
            Ok(response) => {
                match self.store.open(&self.content_store).await {
                    Ok(cache) => {
                        if let Err(err) = cache.put(key, response.clone().into_entry()).await {
                            warn!("Could not cache '{}': {}", key, err);
                        }
                    }
                    Err(err) => warn!("Content store unavailable for '{}': {}", key, err),
                }
                Ok(response)
            }
            Err(network_err) => {
                // Store trouble during fallback reads as a miss; the
                // network error is the one the caller should see.
                let cached = match self.store.open(&self.content_store).await {
                    Ok(cache) => cache.lookup(key).await.ok().flatten(),
                    Err(_) => None,
                };
                match cached {
                    Some(entry) => {
                        debug!("Offline fallback to cached '{}'", key);
                        Ok(entry.into())
                    }
                    None => Err(network_err),
                }
            }
        }
    }
}
