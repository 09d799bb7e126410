//! Fill command - eagerly cache every tracked resource

use super::build_worker;
use crate::cli::args::FillArgs;
use crate::config::Config;
use crate::error::HuskResult;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the fill command
pub async fn execute(args: FillArgs, config: &Config) -> HuskResult<()> {
    let ctx = UiContext::detect();
    let (worker, _) = build_worker(config, args.origin.origin, args.origin.manifest).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Filling offline cache");

    match worker.download_offline().await {
        Ok(0) => spinner.stop("Already complete; nothing was missing"),
        Ok(filled) => spinner.stop(&format!("Cached {} resources for offline use", filled)),
        Err(err) => {
            spinner.stop_error("Offline fill failed");
            return Err(err);
        }
    }
    Ok(())
}
