//! Fetch command - route one request through the cache

use super::build_worker;
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{HuskError, HuskResult};
use crate::router::AssetRequest;
use crate::ui::{self, UiContext};
use crate::worker::{EventOutcome, WorkerEvent};

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> HuskResult<()> {
    let ctx = UiContext::detect();
    let (worker, _) = build_worker(config, args.origin.origin, args.origin.manifest).await?;

    let outcome = worker
        .dispatch(WorkerEvent::Fetch(AssetRequest::get(&args.url)))
        .await?;

    let EventOutcome::Response(response) = outcome else {
        return Err(HuskError::Internal("fetch event returned no response".into()));
    };
    let Some(response) = response else {
        return Err(HuskError::Untracked(args.url));
    };

    let content_type = response.content_type.as_deref().unwrap_or("unknown");
    ui::step_ok(
        &ctx,
        &format!(
            "{} {} bytes ({})",
            response.status,
            response.body.len(),
            content_type
        ),
    );

    if let Some(path) = args.output {
        tokio::fs::write(&path, &response.body)
            .await
            .map_err(|e| HuskError::io(format!("writing response to {}", path.display()), e))?;
        ui::step_ok(&ctx, &format!("Body written to {}", path.display()));
    }

    Ok(())
}
