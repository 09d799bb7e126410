//! Status command - store state and upgrade preview

use super::{fs_store, resolve_manifest_path};
use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::error::HuskResult;
use crate::manifest::{DeployManifest, ManifestRegistry};
use crate::reconcile::reconcile;
use crate::store::{BlobStore, StoreHandle};
use crate::ui::{self, UiContext};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> HuskResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Husk Status");

    let store: Arc<dyn BlobStore> = Arc::new(fs_store(config));
    let names = config.stores.names();

    let content_keys = store.open(&names.content).await?.keys().await?;
    let staging_keys = store.open(&names.staging).await?.keys().await?;
    ui::key_value(&names.content, &format!("{} entries", content_keys.len()));
    ui::key_value(&names.staging, &format!("{} entries", staging_keys.len()));

    let registry = ManifestRegistry::new(Arc::clone(&store), names.manifest.clone());
    let record = registry.load_record().await?;
    match &record {
        Some(record) => ui::key_value(
            &names.manifest,
            &format!(
                "{} resources, saved {}",
                record.manifest.len(),
                record.stored_at.format("%Y-%m-%d %H:%M UTC")
            ),
        ),
        None => ui::key_value(&names.manifest, "absent (next activation starts cold)"),
    }

    // Upgrade preview against the deploy manifest, when one is around.
    let manifest_path = resolve_manifest_path(config, args.manifest);
    if manifest_path.exists() {
        let deploy = DeployManifest::load(&manifest_path).await?;
        let previous = record.map(|record| record.manifest);
        let plan = reconcile(&deploy.resources, previous.as_ref(), &content_keys);

        let resident: BTreeSet<_> = content_keys.iter().collect();
        let missing = deploy
            .resources
            .keys()
            .filter(|key| !resident.contains(key))
            .count();

        println!();
        ui::note(
            &ctx,
            &format!("Upgrade preview ({})", manifest_path.display()),
            &format!(
                "retain {}, evict {}, missing {}",
                plan.retain.len(),
                plan.evict.len(),
                missing
            ),
        );
    } else {
        ui::step_warn(
            &ctx,
            &format!("No deploy manifest at {}", manifest_path.display()),
        );
    }

    Ok(())
}
