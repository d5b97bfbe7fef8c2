//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, apply_config_value, unset_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<AppConfig> {
    store.load()
}

/// Validate, apply and persist `key = value`. Nothing is written on error.
///
/// # Errors
///
/// Returns a `ConfigError` for an unknown key or invalid value, or an I/O
/// error from the store.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<AppConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}

/// Reset `key` to its default and persist.
pub fn unset_value(store: &impl ConfigStore, key: &str) -> Result<AppConfig> {
    let mut config = store.load()?;
    unset_config_value(&mut config, key)?;
    store.save(&config)?;
    Ok(config)
}
