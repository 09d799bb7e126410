//! Command implementations

mod activate;
mod clear;
mod completions;
mod config;
mod fetch;
mod fill;
mod manifest;
mod status;

pub use activate::execute as activate;
pub use clear::execute as clear;
pub use completions::execute as completions;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use fill::execute as fill;
pub use manifest::execute as manifest;
pub use status::execute as status;

use crate::config::{Config, ConfigManager};
use crate::error::HuskResult;
use crate::fetch::create_fetcher;
use crate::manifest::DeployManifest;
use crate::store::FsStore;
use crate::worker::Worker;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Filesystem store rooted at the configured (or default) cache directory
pub(crate) fn fs_store(config: &Config) -> FsStore {
    let root = config
        .stores
        .root
        .clone()
        .unwrap_or_else(ConfigManager::stores_dir);
    FsStore::new(root)
}

/// Deploy manifest path: flag, then config, then ./husk.json
pub(crate) fn resolve_manifest_path(config: &Config, flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| config.origin.deploy_manifest.clone())
        .unwrap_or_else(|| PathBuf::from("husk.json"))
}

/// Build a worker from config plus command-line overrides.
///
/// The origin falls back to the deploy manifest's directory, which makes a
/// freshly generated asset directory usable with no configuration at all.
pub(crate) async fn build_worker(
    config: &Config,
    origin_flag: Option<String>,
    manifest_flag: Option<PathBuf>,
) -> HuskResult<(Worker, PathBuf)> {
    let manifest_path = resolve_manifest_path(config, manifest_flag);
    let deploy = DeployManifest::load(&manifest_path).await?;

    let origin = origin_flag
        .or_else(|| config.origin.url.clone())
        .unwrap_or_else(|| {
            manifest_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."))
                .display()
                .to_string()
        });
    debug!(
        "Worker: origin '{}', manifest {} ({} resources)",
        origin,
        manifest_path.display(),
        deploy.resources.len()
    );

    let worker = Worker::new(
        config.stores.names(),
        Arc::new(fs_store(config)),
        create_fetcher(&origin),
        deploy,
    );
    Ok((worker, manifest_path))
}
