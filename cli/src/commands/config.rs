//! `keyhole config` — show and change configuration values.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key, e.g. keyvault.default_vault or aliases.<name>
        key: String,
        /// Configuration value
        value: String,
    },
    /// Reset a value to its default (or remove an alias)
    Unset {
        /// Configuration key
        key: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the file cannot be
/// read or written.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => {
            config_service::set_value(&app.config_store, &key, &value)?;
            app.output.success(&format!("Set {key} = {value}"));
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Unset { key } => {
            config_service::unset_value(&app.config_store, &key)?;
            app.output.success(&format!("Unset {key}"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let path = app.config_store.path()?;
    app.renderer().render_config(&config, &path)?;
    Ok(ExitCode::SUCCESS)
}
