//! HTTP origin fetcher
//!
//! Wraps a blocking `ureq` agent in `spawn_blocking`. Error statuses are
//! reported as non-ok responses rather than errors so callers can apply
//! their own policy; only transport failures surface as fetch errors.

use crate::error::{HuskError, HuskResult};
use crate::fetch::{AssetFetcher, FetchMode, FetchResponse};
use crate::manifest::ResourceKey;
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// [`AssetFetcher`] for `http(s)://` origins
pub struct HttpFetcher {
    agent: Agent,
    origin: String,
}

impl HttpFetcher {
    pub fn new(origin: &str) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, key: &ResourceKey) -> String {
        if key.is_root() {
            format!("{}/", self.origin)
        } else {
            format!("{}/{}", self.origin, key)
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, key: &ResourceKey, mode: FetchMode) -> HuskResult<FetchResponse> {
        let agent = self.agent.clone();
        let url = self.url_for(key);
        let key = key.clone();
        debug!("GET {} ({:?})", url, mode);

        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&url);
            if mode == FetchMode::Reload {
                request = request
                    .header("Cache-Control", "no-cache")
                    .header("Pragma", "no-cache");
            }

            let mut response = request
                .call()
                .map_err(|e| HuskError::fetch(key.as_str(), e.to_string()))?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| HuskError::fetch(key.as_str(), e.to_string()))?;

            Ok(FetchResponse {
                status,
                content_type,
                body,
            })
        })
        .await
        .map_err(|e| HuskError::Internal(format!("fetch task failed: {e}")))?
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}
