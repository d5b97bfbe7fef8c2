//! Domain types and validators for keyhole configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use keyhole_common::{SecretRef, validate_alias_name, validate_vault_name};
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "timeout_secs",
    "pass.store_dir",
    "pass.program",
    "keyvault.default_vault",
    "keyvault.program",
    "clipboard.clear_after_secs",
    "aliases.<name>",
];

const ALIAS_PREFIX: &str = "aliases.";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLEAR_AFTER_SECS: u64 = 45;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.keyhole/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upper bound on any backend process, in seconds.
    pub timeout_secs: u64,
    pub pass: PassConfig,
    pub keyvault: KeyVaultConfig,
    pub clipboard: ClipboardConfig,
    /// Named references, used as `@name`.
    pub aliases: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pass: PassConfig::default(),
            keyvault: KeyVaultConfig::default(),
            clipboard: ClipboardConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn clear_after(&self) -> Duration {
        Duration::from_secs(self.clipboard.clear_after_secs)
    }

    /// Apply the `config set` rules to a loaded (possibly hand-edited) file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first offending setting.
    pub fn validate(&self) -> Result<()> {
        validate_config_value("timeout_secs", &self.timeout_secs.to_string())?;
        validate_config_value(
            "clipboard.clear_after_secs",
            &self.clipboard.clear_after_secs.to_string(),
        )?;
        validate_config_value("pass.program", &self.pass.program)?;
        validate_config_value("keyvault.program", &self.keyvault.program)?;
        if let Some(vault) = &self.keyvault.default_vault {
            validate_config_value("keyvault.default_vault", vault)?;
        }
        for (name, target) in &self.aliases {
            validate_config_value(&format!("{ALIAS_PREFIX}{name}"), target)?;
        }
        Ok(())
    }
}

/// `pass` backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Store directory. Falls back to `PASSWORD_STORE_DIR`, then `~/.password-store`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<String>,
    pub program: String,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            program: "pass".to_string(),
        }
    }
}

/// Azure Key Vault backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyVaultConfig {
    /// Vault used by `keyvault:<name>` references without an explicit vault.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_vault: Option<String>,
    pub program: String,
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            default_vault: None,
            program: "az".to_string(),
        }
    }
}

/// Clipboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    pub clear_after_secs: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            clear_after_secs: DEFAULT_CLEAR_AFTER_SECS,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

fn unknown_key(key: &str) -> anyhow::Error {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
    .into()
}

fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if let Some(name) = key.strip_prefix(ALIAS_PREFIX) {
        return validate_alias_name(name).map_err(|_| unknown_key(key));
    }
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    if key.starts_with(ALIAS_PREFIX) {
        let target = SecretRef::parse(value).map_err(|e| invalid_value(key, value, e.to_string()))?;
        if target.is_alias() {
            return Err(invalid_value(key, value, "aliases cannot point at other aliases"));
        }
        return Ok(());
    }
    match key {
        "timeout_secs" | "clipboard.clear_after_secs" => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid_value(key, value, "expected a positive whole number of seconds")),
        },
        "keyvault.default_vault" => {
            validate_vault_name(value).map_err(|e| invalid_value(key, value, e.to_string()))
        }
        "pass.store_dir" | "pass.program" | "keyvault.program" => {
            if value.trim().is_empty() {
                Err(invalid_value(key, value, "value must not be empty"))
            } else {
                Ok(())
            }
        }
        _ => Err(unknown_key(key)),
    }
}

/// Validates and applies `key = value` to `config`.
///
/// # Errors
///
/// Returns an error if the key or value is invalid.
pub fn apply_config_value(config: &mut AppConfig, key: &str, value: &str) -> Result<()> {
    validate_config_value(key, value)?;
    if let Some(name) = key.strip_prefix(ALIAS_PREFIX) {
        config.aliases.insert(name.to_string(), value.trim().to_string());
        return Ok(());
    }
    // Numbers were checked by validate_config_value.
    let seconds = || value.parse::<u64>().map_err(|_| invalid_value(key, value, "not a number"));
    match key {
        "timeout_secs" => config.timeout_secs = seconds()?,
        "clipboard.clear_after_secs" => config.clipboard.clear_after_secs = seconds()?,
        "pass.store_dir" => config.pass.store_dir = Some(value.to_string()),
        "pass.program" => config.pass.program = value.to_string(),
        "keyvault.default_vault" => config.keyvault.default_vault = Some(value.to_string()),
        "keyvault.program" => config.keyvault.program = value.to_string(),
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

/// Resets `key` to its default (or removes the alias).
///
/// # Errors
///
/// Returns an error if the key is invalid.
pub fn unset_config_value(config: &mut AppConfig, key: &str) -> Result<()> {
    validate_config_key(key)?;
    if let Some(name) = key.strip_prefix(ALIAS_PREFIX) {
        config.aliases.remove(name);
        return Ok(());
    }
    let defaults = AppConfig::default();
    match key {
        "timeout_secs" => config.timeout_secs = defaults.timeout_secs,
        "clipboard.clear_after_secs" => config.clipboard = defaults.clipboard,
        "pass.store_dir" => config.pass.store_dir = None,
        "pass.program" => config.pass.program = defaults.pass.program,
        "keyvault.default_vault" => config.keyvault.default_vault = None,
        "keyvault.program" => config.keyvault.program = defaults.keyvault.program,
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
