//! Activate command - run the full install/activate upgrade cycle

use super::build_worker;
use crate::cli::args::ActivateArgs;
use crate::config::Config;
use crate::error::HuskResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::WorkerEvent;

/// Execute the activate command
pub async fn execute(args: ActivateArgs, config: &Config) -> HuskResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Husk Activate");

    let (worker, manifest_path) = build_worker(config, args.origin.origin, args.origin.manifest).await?;
    ui::key_value("manifest", &manifest_path.display().to_string());

    let core_count = worker.lifecycle().core().len();
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Staging {} core assets", core_count));

    if let Err(err) = worker.dispatch(WorkerEvent::Install).await {
        spinner.stop_error("Install failed; staging is incomplete");
        return Err(err);
    }

    spinner.message("Reconciling caches");
    if let Err(err) = worker.dispatch(WorkerEvent::Activate).await {
        spinner.stop_error("Activation failed; all cache stores were discarded");
        return Err(err);
    }

    spinner.stop(&format!(
        "Activated build with {} resources",
        worker.manifest().len()
    ));
    ui::outro_success(&ctx, "Cache is ready");
    Ok(())
}
