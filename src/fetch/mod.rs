//! Origin fetch abstraction
//!
//! Every network access in husk resolves a resource key against one
//! configured origin; there is no ambient origin state. Two backends
//! exist: an HTTP client for `http(s)://` origins and a local
//! deploy-directory backend used by tooling and tests.

pub mod dir;
pub mod http;

pub use dir::DirFetcher;
pub use http::HttpFetcher;

use crate::error::HuskResult;
use crate::manifest::ResourceKey;
use crate::store::CachedEntry;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// How to treat upstream HTTP caches for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Normal request semantics
    Default,
    /// Bypass any intermediate cache layer and always reach the origin
    Reload,
}

/// A fetched response payload
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the status is in the successful range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert into a storable cache entry
    pub fn into_entry(self) -> CachedEntry {
        CachedEntry::new(self.status, self.content_type, self.body)
    }
}

impl From<CachedEntry> for FetchResponse {
    fn from(entry: CachedEntry) -> Self {
        Self {
            status: entry.status,
            content_type: entry.content_type,
            body: entry.body,
        }
    }
}

/// Resolves resource keys against a configured origin and fetches them
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch a resource. Unreachability is an error; an HTTP error status
    /// is a non-ok response.
    async fn fetch(&self, key: &ResourceKey, mode: FetchMode) -> HuskResult<FetchResponse>;

    /// The origin requests are resolved against
    fn origin(&self) -> &str;
}

/// Pick a fetcher for an origin: `http(s)` URLs get the network client,
/// anything else is treated as a local deploy directory.
pub fn create_fetcher(origin: &str) -> Arc<dyn AssetFetcher> {
    if origin.starts_with("http://") || origin.starts_with("https://") {
        Arc::new(HttpFetcher::new(origin))
    } else {
        Arc::new(DirFetcher::new(PathBuf::from(origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_range() {
        let mut response = FetchResponse {
            status: 200,
            content_type: None,
            body: vec![],
        };
        assert!(response.is_ok());

        response.status = 204;
        assert!(response.is_ok());

        response.status = 404;
        assert!(!response.is_ok());

        response.status = 301;
        assert!(!response.is_ok());
    }

    #[test]
    fn factory_picks_backend_by_scheme() {
        assert_eq!(
            create_fetcher("https://app.example.com").origin(),
            "https://app.example.com"
        );
        assert_eq!(create_fetcher("/srv/www/app").origin(), "/srv/www/app");
    }

    #[test]
    fn entry_conversion_preserves_payload() {
        let response = FetchResponse {
            status: 200,
            content_type: Some("text/html".into()),
            body: b"<html>".to_vec(),
        };
        let entry = response.clone().into_entry();
        let back = FetchResponse::from(entry);
        assert_eq!(back.status, response.status);
        assert_eq!(back.content_type, response.content_type);
        assert_eq!(back.body, response.body);
    }
}
