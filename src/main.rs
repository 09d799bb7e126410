//! Husk - Offline-first asset cache manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use husk::cli::{commands, Cli, Commands};
use husk::config::ConfigManager;
use husk::error::HuskResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> HuskResult<()> {
    let cli = Cli::parse();

    // Completions write straight to stdout; no config or logging involved.
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        std::env::current_dir()
            .ok()
            .and_then(|cwd| ConfigManager::find_local_config(&cwd))
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Initialize logging: flag wins, config verbosity is the floor.
    let level = if cli.verbose > 0 {
        cli.verbose
    } else {
        u8::from(config.general.verbose)
    };
    let filter = match level {
        0 => EnvFilter::new("husk=warn"),
        1 => EnvFilter::new("husk=info"),
        _ => EnvFilter::new("husk=debug"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    if let Some(ref path) = local_config_path {
        debug!("Merged local config from {}", path.display());
    }

    // Dispatch to command
    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Activate(args) => commands::activate(args, &config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Fill(args) => commands::fill(args, &config).await,
        Commands::Clear(args) => commands::clear(args, &config).await,
        Commands::Manifest(args) => commands::manifest(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}
