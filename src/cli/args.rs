//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Husk - Offline-first asset cache manager
///
/// Stages, reconciles, and serves a single-page application shell from a
/// local cache, keyed by a fingerprint manifest generated at build time.
#[derive(Parser, Debug)]
#[command(name = "husk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "HUSK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .husk.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage core assets and activate the current build
    Activate(ActivateArgs),

    /// Show cache store state and an upgrade preview
    Status(StatusArgs),

    /// Route one request through the cache
    Fetch(FetchArgs),

    /// Eagerly cache every tracked resource for offline use
    Fill(FillArgs),

    /// Delete all cache stores
    Clear(ClearArgs),

    /// Deploy manifest tooling
    Manifest(ManifestArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Origin and deploy manifest selection, shared by cache commands
#[derive(Parser, Debug, Clone)]
pub struct OriginArgs {
    /// Origin URL or deploy directory (defaults to the manifest's directory)
    #[arg(short, long)]
    pub origin: Option<String>,

    /// Deploy manifest path (defaults to husk.json)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}

/// Arguments for the activate command
#[derive(Parser, Debug)]
pub struct ActivateArgs {
    #[command(flatten)]
    pub origin: OriginArgs,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Deploy manifest to preview an upgrade against (defaults to husk.json)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Request URL (absolute, or origin-relative like "assets/app.js")
    pub url: String,

    /// Write the response body to a file instead of summarizing it
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub origin: OriginArgs,
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub origin: OriginArgs,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the manifest command
#[derive(Parser, Debug)]
pub struct ManifestArgs {
    /// Subcommand for manifest
    #[command(subcommand)]
    pub action: ManifestAction,
}

/// Manifest subcommands
#[derive(Subcommand, Debug)]
pub enum ManifestAction {
    /// Generate a deploy manifest from an asset directory
    Gen {
        /// Asset directory to scan
        dir: PathBuf,

        /// Output path (defaults to husk.json inside the asset directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entry document, aliased to "/" in the manifest
        #[arg(long, default_value = "index.html")]
        entry: String,

        /// Core application-shell files (repeatable; defaults to the entry
        /// document)
        #[arg(long)]
        core: Vec<String>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., origin.url)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local .husk.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_activate() {
        let cli = Cli::parse_from(["husk", "activate", "--origin", "https://app.example.com"]);
        match cli.command {
            Commands::Activate(args) => {
                assert_eq!(args.origin.origin.as_deref(), Some("https://app.example.com"));
                assert!(args.origin.manifest.is_none());
            }
            _ => panic!("expected Activate command"),
        }
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from(["husk", "fetch", "assets/app.js"]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "assets/app.js");
                assert!(args.output.is_none());
            }
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_manifest_gen() {
        let cli = Cli::parse_from([
            "husk", "manifest", "gen", "dist", "--core", "index.html", "--core", "app.js",
        ]);
        match cli.command {
            Commands::Manifest(args) => match args.action {
                ManifestAction::Gen { dir, entry, core, .. } => {
                    assert_eq!(dir, PathBuf::from("dist"));
                    assert_eq!(entry, "index.html");
                    assert_eq!(core, vec!["index.html", "app.js"]);
                }
            },
            _ => panic!("expected Manifest command"),
        }
    }

    #[test]
    fn cli_parses_clear_yes() {
        let cli = Cli::parse_from(["husk", "clear", "--yes"]);
        match cli.command {
            Commands::Clear(args) => assert!(args.yes),
            _ => panic!("expected Clear command"),
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["husk", "config", "set", "origin.url", "https://x", "--local"]);
        match cli.command {
            Commands::Config(args) => match args.action {
                Some(ConfigAction::Set { key, value, local }) => {
                    assert_eq!(key, "origin.url");
                    assert_eq!(value, "https://x");
                    assert!(local);
                }
                _ => panic!("expected Set action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["husk", "status"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["husk", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }
}
