//! Deploy-directory fetcher
//!
//! Treats a local directory of built assets as the origin. Tooling uses
//! this to exercise the full install/activate/fetch cycle without a
//! server; tests use it as a deterministic origin.

use crate::error::{HuskError, HuskResult};
use crate::fetch::{AssetFetcher, FetchMode, FetchResponse};
use crate::manifest::ResourceKey;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// [`AssetFetcher`] reading from a local deploy directory
pub struct DirFetcher {
    root: PathBuf,
    origin: String,
}

impl DirFetcher {
    pub fn new(root: PathBuf) -> Self {
        let origin = root.display().to_string();
        Self { root, origin }
    }

    fn path_for(&self, key: &ResourceKey) -> PathBuf {
        if key.is_root() {
            self.root.join("index.html")
        } else {
            self.root.join(key.as_str())
        }
    }
}

#[async_trait]
impl AssetFetcher for DirFetcher {
    async fn fetch(&self, key: &ResourceKey, _mode: FetchMode) -> HuskResult<FetchResponse> {
        let path = self.path_for(key);
        debug!("Reading {} from deploy directory", path.display());

        match fs::read(&path).await {
            Ok(body) => Ok(FetchResponse {
                status: 200,
                content_type: content_type_for(key),
                body,
            }),
            // A file the origin never had is a 404, not unreachability.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }),
            Err(e) => Err(HuskError::fetch(key.as_str(), e.to_string())),
        }
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}

/// Content type guessed from the key's extension
fn content_type_for(key: &ResourceKey) -> Option<String> {
    let ext = if key.is_root() {
        "html"
    } else {
        key.as_str().rsplit('.').next().unwrap_or("")
    };

    let content_type = match ext {
        "html" | "htm" => "text/html",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "wasm" => "application/wasm",
        "otf" | "ttf" => "font/otf",
        _ => "application/octet-stream",
    };
    Some(content_type.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn serves_files_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), b"js").unwrap();

        let fetcher = DirFetcher::new(dir.path().to_path_buf());
        let response = fetcher
            .fetch(&ResourceKey::new("app.js"), FetchMode::Default)
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.body, b"js");
        assert_eq!(
            response.content_type.as_deref(),
            Some("application/javascript")
        );
    }

    #[tokio::test]
    async fn root_resolves_to_entry_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html>").unwrap();

        let fetcher = DirFetcher::new(dir.path().to_path_buf());
        let response = fetcher
            .fetch(&ResourceKey::root(), FetchMode::Default)
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.body, b"<html>");
    }

    #[tokio::test]
    async fn missing_file_is_not_found_response() {
        let dir = TempDir::new().unwrap();
        let fetcher = DirFetcher::new(dir.path().to_path_buf());

        let response = fetcher
            .fetch(&ResourceKey::new("absent.js"), FetchMode::Default)
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_ok());
    }
}
