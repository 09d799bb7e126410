//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{HuskError, HuskResult};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> HuskResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
        ConfigAction::Init { force } => {
            if manager.path().exists() && !force {
                return Err(HuskError::User(format!(
                    "Configuration already exists at {} (use --force to overwrite)",
                    manager.path().display()
                )));
            }
            manager.save(&Config::default()).await?;
            println!("Wrote {}", manager.path().display());
            Ok(())
        }
        ConfigAction::Set { key, value, local } => {
            if local {
                ConfigManager::with_path(PathBuf::from(".husk.toml"))
                    .set_value(&key, &value)
                    .await
            } else {
                manager.set_value(&key, &value).await
            }
        }
    }
}
