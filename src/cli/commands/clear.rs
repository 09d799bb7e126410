//! Clear command - delete all cache stores

use super::fs_store;
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::HuskResult;
use crate::store::BlobStore;
use crate::ui::{self, UiContext};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> HuskResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    let confirmed = ui::confirm(
        &ctx,
        "Delete all cache stores? The next activation will start cold.",
        false,
    )
    .await?;
    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    let store = fs_store(config);
    let names = config.stores.names();
    let mut deleted = 0;
    for name in [&names.content, &names.staging, &names.manifest] {
        if store.delete(name).await? {
            deleted += 1;
        }
    }

    ui::step_ok(&ctx, &format!("Deleted {} cache stores", deleted));
    Ok(())
}
