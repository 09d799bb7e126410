//! Manifest command - deploy manifest tooling

use crate::cli::args::{ManifestAction, ManifestArgs};
use crate::config::Config;
use crate::error::{HuskError, HuskResult};
use crate::manifest::generate::{alias_root, collect_files, fingerprint_file, relative_key};
use crate::manifest::{DeployManifest, ResourceKey, ResourceManifest};
use crate::ui::{self, FileProgress, UiContext};
use std::path::PathBuf;

/// Execute the manifest command
pub async fn execute(args: ManifestArgs, _config: &Config) -> HuskResult<()> {
    match args.action {
        ManifestAction::Gen {
            dir,
            output,
            entry,
            core,
        } => gen(dir, output, entry, core).await,
    }
}

async fn gen(
    dir: PathBuf,
    output: Option<PathBuf>,
    entry: String,
    core: Vec<String>,
) -> HuskResult<()> {
    let ctx = UiContext::detect();
    let output = output.unwrap_or_else(|| dir.join("husk.json"));

    let files: Vec<PathBuf> = collect_files(&dir)?
        .into_iter()
        // A previously generated manifest is not an asset of the build.
        .filter(|path| *path != output)
        .collect();

    let progress = FileProgress::new(&ctx, files.len() as u64, "Hashing assets");
    let mut resources = ResourceManifest::new();
    for path in &files {
        resources.insert(relative_key(&dir, path), fingerprint_file(path)?);
        progress.tick();
    }
    progress.finish();

    alias_root(&mut resources, &entry);

    let core: Vec<ResourceKey> = if core.is_empty() {
        vec![ResourceKey::new(&entry)]
    } else {
        core.into_iter().map(ResourceKey::new).collect()
    };
    for key in &core {
        if !resources.contains(key) {
            return Err(HuskError::User(format!(
                "core entry '{key}' is not a scanned asset"
            )));
        }
    }

    let deploy = DeployManifest {
        resources,
        core,
    };
    deploy.save(&output).await?;

    ui::step_ok(
        &ctx,
        &format!(
            "Wrote {} ({} resources, {} core)",
            output.display(),
            deploy.resources.len(),
            deploy.core.len()
        ),
    );
    Ok(())
}
