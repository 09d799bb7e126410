//! Worker event dispatch
//!
//! Ties the lifecycle controller and the router together behind the four
//! host signals: install, activate, fetch, and message. The host awaits
//! [`Worker::dispatch`] for each event, which preserves the
//! deferred-completion contract without callback registration.

use crate::clients::ClientRegistry;
use crate::config::StoreNames;
use crate::error::HuskResult;
use crate::fetch::{AssetFetcher, FetchMode, FetchResponse};
use crate::lifecycle::{LifecycleController, WorkerPhase};
use crate::manifest::{DeployManifest, ResourceKey, ResourceManifest};
use crate::router::{AssetRequest, Router};
use crate::store::{BlobStore, StoreHandle};
use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Host lifecycle signals delivered to the worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(AssetRequest),
    /// Raw message payload; unknown messages are ignored
    Message(String),
}

/// Control messages understood by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Force immediate takeover of the active instance
    SkipWaiting,
    /// Eagerly cache every tracked resource still missing
    DownloadOffline,
}

impl ControlMessage {
    /// Parse the literal wire strings; anything else is `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }
}

/// What handling one event produced
#[derive(Debug)]
pub enum EventOutcome {
    /// The event's work completed
    Done,
    /// A fetch event; `None` means pass through to the network
    Response(Option<FetchResponse>),
}

/// One worker instance serving one deployed build
pub struct Worker {
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn AssetFetcher>,
    manifest: ResourceManifest,
    content_store: String,
    lifecycle: LifecycleController,
    router: Router,
    clients: Arc<ClientRegistry>,
    skip_waiting: AtomicBool,
}

impl Worker {
    pub fn new(
        names: StoreNames,
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn AssetFetcher>,
        deploy: DeployManifest,
    ) -> Self {
        let clients = Arc::new(ClientRegistry::new());
        let lifecycle = LifecycleController::new(
            names.clone(),
            Arc::clone(&store),
            Arc::clone(&fetcher),
            &deploy,
            Arc::clone(&clients),
        );
        let router = Router::new(
            &names,
            Arc::clone(&store),
            Arc::clone(&fetcher),
            deploy.resources.clone(),
        );
        Self {
            store,
            fetcher,
            manifest: deploy.resources,
            content_store: names.content,
            lifecycle,
            router,
            clients,
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// Handle one host event to completion
    pub async fn dispatch(&self, event: WorkerEvent) -> HuskResult<EventOutcome> {
        match event {
            WorkerEvent::Install => {
                // A fresh install always wants to take over immediately.
                self.skip_waiting.store(true, Ordering::SeqCst);
                self.lifecycle.install().await?;
                Ok(EventOutcome::Done)
            }
            WorkerEvent::Activate => {
                self.lifecycle.activate().await?;
                Ok(EventOutcome::Done)
            }
            WorkerEvent::Fetch(request) => {
                Ok(EventOutcome::Response(self.router.handle(&request).await?))
            }
            WorkerEvent::Message(raw) => {
                match ControlMessage::parse(&raw) {
                    Some(ControlMessage::SkipWaiting) => {
                        self.skip_waiting.store(true, Ordering::SeqCst);
                    }
                    Some(ControlMessage::DownloadOffline) => {
                        let filled = self.download_offline().await?;
                        info!("Offline fill cached {} resources", filled);
                    }
                    None => debug!("Ignoring unknown control message: {:?}", raw),
                }
                Ok(EventOutcome::Done)
            }
        }
    }

    /// Eagerly fetch and cache every tracked resource the content store
    /// does not hold. Best-effort: failures are logged and skipped,
    /// whatever succeeds stays cached. Returns how many were cached.
    pub async fn download_offline(&self) -> HuskResult<usize> {
        let content = self.store.open(&self.content_store).await?;
        let resident: BTreeSet<ResourceKey> = content.keys().await?.into_iter().collect();
        let missing: Vec<&ResourceKey> = self
            .manifest
            .keys()
            .filter(|key| !resident.contains(*key))
            .collect();

        debug!("Offline fill: {} resources missing", missing.len());
        let results = join_all(missing.into_iter().map(|key| {
            let content = Arc::clone(&content);
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                match fetcher.fetch(key, FetchMode::Default).await {
                    Ok(response) if response.is_ok() => {
                        match content.put(key, response.into_entry()).await {
                            Ok(()) => true,
                            Err(err) => {
                                warn!("Offline fill could not cache '{}': {}", key, err);
                                false
                            }
                        }
                    }
                    Ok(response) => {
                        warn!(
                            "Offline fill: origin returned status {} for '{}'",
                            response.status, key
                        );
                        false
                    }
                    Err(err) => {
                        warn!("Offline fill: fetch failed for '{}': {}", key, err);
                        false
                    }
                }
            }
        }))
        .await;

        Ok(results.into_iter().filter(|ok| *ok).count())
    }

    /// Whether this instance asked to take over immediately
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Register a page client with this worker
    pub async fn register_client(&self) -> Uuid {
        self.clients.register().await
    }

    pub async fn phase(&self) -> WorkerPhase {
        self.lifecycle.phase().await
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }
}
