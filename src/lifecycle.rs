//! Install/activate lifecycle
//!
//! Drives one worker instance from staging through activation. Install
//! stages the application-shell core set into the transient staging store
//! with cache-busting fetches; activate reconciles the resident content
//! store against the persisted previous manifest, merges the staged
//! entries, persists the current manifest, and claims page clients.
//!
//! Any failure during activation leaves the cache in an unknowable state,
//! so recovery is whole-store deletion: content, staging, and manifest
//! stores are all discarded and the next activation starts cold. An empty
//! cache degrades to network fetches; an inconsistent one serves stale
//! bytes.

use crate::clients::ClientRegistry;
use crate::config::StoreNames;
use crate::error::{HuskError, HuskResult};
use crate::fetch::{AssetFetcher, FetchMode};
use crate::manifest::{DeployManifest, ManifestRegistry, ResourceKey, ResourceManifest};
use crate::reconcile::reconcile;
use crate::store::{BlobStore, StoreHandle};
use futures_util::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Lifecycle state of a worker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Staging core assets; not yet serving from a fresh build
    Installing,
    /// Reconciling and swapping caches
    Activating,
    /// Activation completed; the content store is authoritative
    Active,
    /// Activation failed; stores were discarded
    Failed,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Installing => "installing",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Orchestrates install and activate for one build
pub struct LifecycleController {
    names: StoreNames,
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn AssetFetcher>,
    registry: ManifestRegistry,
    current: ResourceManifest,
    core: Vec<ResourceKey>,
    clients: Arc<ClientRegistry>,
    phase: RwLock<WorkerPhase>,
}

impl LifecycleController {
    pub fn new(
        names: StoreNames,
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn AssetFetcher>,
        deploy: &DeployManifest,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        let registry = ManifestRegistry::new(Arc::clone(&store), names.manifest.clone());
        Self {
            names,
            store,
            fetcher,
            registry,
            current: deploy.resources.clone(),
            core: deploy.core.clone(),
            clients,
            phase: RwLock::new(WorkerPhase::Installing),
        }
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> WorkerPhase {
        *self.phase.read().await
    }

    pub fn registry(&self) -> &ManifestRegistry {
        &self.registry
    }

    /// The application-shell core set staged during install
    pub fn core(&self) -> &[ResourceKey] {
        &self.core
    }

    /// Stage the core set into the staging store.
    ///
    /// Fetches bypass upstream HTTP caches so a new build's bytes always
    /// come from the origin. Any failure aborts the install; the staging
    /// store is left incomplete and install may be retried.
    pub async fn install(&self) -> HuskResult<()> {
        self.set_phase(WorkerPhase::Installing).await;
        let staging = self.store.open(&self.names.staging).await?;

        try_join_all(self.core.iter().map(|key| {
            let staging = Arc::clone(&staging);
            let fetcher = Arc::clone(&self.fetcher);
            let key = key.clone();
            async move {
                let response = fetcher.fetch(&key, FetchMode::Reload).await?;
                if !response.is_ok() {
                    return Err(HuskError::fetch(
                        key.as_str(),
                        format!("origin returned status {}", response.status),
                    ));
                }
                staging.put(&key, response.into_entry()).await
            }
        }))
        .await?;

        info!(
            "Staged {} core assets into '{}'",
            self.core.len(),
            self.names.staging
        );
        Ok(())
    }

    /// Reconcile, merge staged entries, persist the manifest, claim
    /// clients. On any failure all three stores are discarded and the
    /// controller transitions to [`WorkerPhase::Failed`].
    pub async fn activate(&self) -> HuskResult<()> {
        self.set_phase(WorkerPhase::Activating).await;

        match self.activate_inner().await {
            Ok(claimed) => {
                self.set_phase(WorkerPhase::Active).await;
                info!(
                    "Activated build with {} resources ({} clients claimed)",
                    self.current.len(),
                    claimed
                );
                Ok(())
            }
            Err(err) => {
                error!("Activation failed, discarding cache state: {err}");
                self.teardown_best_effort().await;
                self.set_phase(WorkerPhase::Failed).await;
                Err(err)
            }
        }
    }

    async fn activate_inner(&self) -> HuskResult<usize> {
        let previous = self.registry.load_previous().await?;

        let content = match previous {
            None => {
                // Cold path: discard whatever is resident and rebuild
                // entirely from staging.
                debug!(
                    "No previous manifest; rebuilding '{}' from scratch",
                    self.names.content
                );
                self.store.delete(&self.names.content).await?;
                self.store.open(&self.names.content).await?
            }
            Some(previous) => {
                let content = self.store.open(&self.names.content).await?;
                let resident = content.keys().await?;
                let plan = reconcile(&self.current, Some(&previous), &resident);
                debug!(
                    "Reconciled '{}': retain {}, evict {}",
                    self.names.content,
                    plan.retain.len(),
                    plan.evict.len()
                );

                // Evictions must be observably complete before the staging
                // merge; a changed key may never be served with old bytes.
                for key in &plan.evict {
                    content.remove(key).await?;
                }
                content
            }
        };

        // Merge staged entries. Staged copies win over retained ones.
        let staging = self.store.open(&self.names.staging).await?;
        for key in staging.keys().await? {
            if let Some(entry) = staging.lookup(&key).await? {
                content.put(&key, entry).await?;
            }
        }
        self.store.delete(&self.names.staging).await?;

        self.registry.replace(&self.current).await?;
        Ok(self.clients.claim_all().await)
    }

    /// Failure-path teardown: delete everything, log what cannot be
    /// deleted. Never raises; there is nothing better to do.
    async fn teardown_best_effort(&self) {
        for name in [
            &self.names.content,
            &self.names.staging,
            &self.names.manifest,
        ] {
            if let Err(err) = self.store.delete(name).await {
                error!("Teardown could not delete store '{}': {}", name, err);
            }
        }
    }

    async fn set_phase(&self, phase: WorkerPhase) {
        *self.phase.write().await = phase;
    }
}
