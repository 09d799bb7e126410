//! Shared test doubles

use crate::error::{HuskError, HuskResult};
use crate::fetch::{AssetFetcher, FetchMode, FetchResponse};
use crate::manifest::{DeployManifest, Fingerprint, ResourceKey, ResourceManifest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Build a deploy manifest from literal (key, fingerprint) pairs
pub(crate) fn deploy(resources: &[(&str, &str)], core: &[&str]) -> DeployManifest {
    let resources: ResourceManifest = resources
        .iter()
        .map(|(k, h)| (ResourceKey::new(*k), Fingerprint::new(*h)))
        .collect();
    DeployManifest {
        resources,
        core: core.iter().map(|key| ResourceKey::new(*key)).collect(),
    }
}

/// Scripted origin: serves a fixed key → body table, can be taken offline,
/// and records every fetch it sees.
pub(crate) struct StaticFetcher {
    origin: String,
    resources: Mutex<HashMap<ResourceKey, Vec<u8>>>,
    offline: AtomicBool,
    log: Mutex<Vec<(ResourceKey, FetchMode)>>,
}

impl StaticFetcher {
    pub(crate) fn new(pairs: &[(&str, &[u8])]) -> Self {
        Self {
            origin: "https://app.test".to_string(),
            resources: Mutex::new(
                pairs
                    .iter()
                    .map(|(k, body)| (ResourceKey::new(*k), body.to_vec()))
                    .collect(),
            ),
            offline: AtomicBool::new(false),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Replace one resource's bytes, as a new build would
    pub(crate) fn set(&self, key: &str, body: &[u8]) {
        self.resources
            .lock()
            .unwrap()
            .insert(ResourceKey::new(key), body.to_vec());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn log(&self) -> Vec<(ResourceKey, FetchMode)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetFetcher for StaticFetcher {
    async fn fetch(&self, key: &ResourceKey, mode: FetchMode) -> HuskResult<FetchResponse> {
        self.log.lock().unwrap().push((key.clone(), mode));

        if self.offline.load(Ordering::SeqCst) {
            return Err(HuskError::fetch(key.as_str(), "origin unreachable"));
        }

        match self.resources.lock().unwrap().get(key) {
            Some(body) => Ok(FetchResponse {
                status: 200,
                content_type: None,
                body: body.clone(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }),
        }
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}
