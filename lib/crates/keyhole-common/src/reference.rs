//! Secret references: `<scheme>:<location>` strings naming where a secret lives.
//!
//! A reference is not itself secret and may appear in logs and error messages.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Maximum alias name length.
const MAX_ALIAS_LEN: usize = 64;

/// Backend a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Pass,
    Env,
    File,
    KeyVault,
}

impl Scheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Pass => "pass",
            Scheme::Env => "env",
            Scheme::File => "file",
            Scheme::KeyVault => "keyvault",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a reference string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("reference is empty")]
    Empty,

    #[error("missing scheme (expected pass:, env:, file:, keyvault: or @alias)")]
    MissingScheme,

    #[error("unknown scheme '{0}'")]
    UnknownScheme(String),

    #[error("invalid {scheme} location: {reason}")]
    InvalidLocation { scheme: &'static str, reason: String },
}

fn invalid(scheme: &'static str, reason: impl Into<String>) -> ReferenceError {
    ReferenceError::InvalidLocation {
        scheme,
        reason: reason.into(),
    }
}

/// A parsed secret reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef {
    /// Entry in the `pass` store, optionally a named `field: value` line.
    Pass { path: String, field: Option<String> },
    /// Environment variable.
    Env { name: String },
    /// File on disk. May start with `~/`; expansion happens when it is read.
    File { path: PathBuf },
    /// Azure Key Vault secret. `vault` is `None` until the default is applied.
    KeyVault { vault: Option<String>, name: String },
    /// Named entry in the config alias table.
    Alias { name: String },
}

impl SecretRef {
    /// Parse a reference string.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if let Some(name) = raw.strip_prefix('@') {
            validate_alias_name(name)?;
            return Ok(SecretRef::Alias {
                name: name.to_string(),
            });
        }
        let (scheme, location) = raw.split_once(':').ok_or(ReferenceError::MissingScheme)?;
        match scheme {
            "pass" => parse_pass(location),
            "env" => {
                validate_env_name(location)?;
                Ok(SecretRef::Env {
                    name: location.to_string(),
                })
            }
            "file" => parse_file(location),
            "keyvault" => parse_keyvault(location),
            other => Err(ReferenceError::UnknownScheme(other.to_string())),
        }
    }

    /// Backend scheme, or `None` for an alias.
    #[must_use]
    pub fn scheme(&self) -> Option<Scheme> {
        match self {
            SecretRef::Pass { .. } => Some(Scheme::Pass),
            SecretRef::Env { .. } => Some(Scheme::Env),
            SecretRef::File { .. } => Some(Scheme::File),
            SecretRef::KeyVault { .. } => Some(Scheme::KeyVault),
            SecretRef::Alias { .. } => None,
        }
    }

    #[must_use]
    pub fn is_alias(&self) -> bool {
        matches!(self, SecretRef::Alias { .. })
    }
}

impl FromStr for SecretRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRef::Pass { path, field: None } => write!(f, "pass:{path}"),
            SecretRef::Pass {
                path,
                field: Some(field),
            } => write!(f, "pass:{path}#{field}"),
            SecretRef::Env { name } => write!(f, "env:{name}"),
            SecretRef::File { path } => write!(f, "file:{}", path.display()),
            SecretRef::KeyVault {
                vault: Some(vault),
                name,
            } => write!(f, "keyvault:{vault}/{name}"),
            SecretRef::KeyVault { vault: None, name } => write!(f, "keyvault:{name}"),
            SecretRef::Alias { name } => write!(f, "@{name}"),
        }
    }
}

fn parse_pass(location: &str) -> Result<SecretRef, ReferenceError> {
    let (path, field) = match location.split_once('#') {
        Some((path, field)) => {
            if field.is_empty() || field.contains('#') {
                return Err(invalid("pass", "field after '#' must be a non-empty name"));
            }
            (path, Some(field.to_string()))
        }
        None => (location, None),
    };

    if path.is_empty() {
        return Err(invalid("pass", "entry path is empty"));
    }
    if path.starts_with('/') {
        return Err(invalid("pass", "entry path must be relative to the store"));
    }
    if path.starts_with('-') {
        return Err(invalid("pass", "entry path must not start with '-'"));
    }
    if path.contains('\0') {
        return Err(invalid("pass", "entry path contains a NUL byte"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("pass", "entry path has an empty segment")),
            "." | ".." => return Err(invalid("pass", "entry path must not contain '.' or '..'")),
            _ => {}
        }
    }

    Ok(SecretRef::Pass {
        path: path.to_string(),
        field,
    })
}

fn parse_file(location: &str) -> Result<SecretRef, ReferenceError> {
    if location.contains('\0') {
        return Err(invalid("file", "path contains a NUL byte"));
    }
    let absolute = location.starts_with('/') || location == "~" || location.starts_with("~/");
    if !absolute {
        return Err(invalid("file", "path must be absolute or start with ~/"));
    }
    Ok(SecretRef::File {
        path: PathBuf::from(location),
    })
}

fn parse_keyvault(location: &str) -> Result<SecretRef, ReferenceError> {
    match location.split_once('/') {
        Some((vault, name)) => {
            validate_vault_name(vault)?;
            validate_secret_name(name)?;
            Ok(SecretRef::KeyVault {
                vault: Some(vault.to_string()),
                name: name.to_string(),
            })
        }
        None => {
            validate_secret_name(location)?;
            Ok(SecretRef::KeyVault {
                vault: None,
                name: location.to_string(),
            })
        }
    }
}

/// Validates a POSIX-style environment variable name.
pub fn validate_env_name(name: &str) -> Result<(), ReferenceError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(
            "env",
            format!("'{name}' must match [A-Za-z_][A-Za-z0-9_]*"),
        ));
    }
    Ok(())
}

/// Validates an Azure Key Vault name: 3-24 chars, alphanumerics and `-`,
/// starting with a letter and not ending with `-`.
pub fn validate_vault_name(name: &str) -> Result<(), ReferenceError> {
    let len_ok = (3..=24).contains(&name.len());
    let chars_ok = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !len_ok || !chars_ok || !starts_ok || name.ends_with('-') {
        return Err(invalid(
            "keyvault",
            format!("vault name '{name}' must be 3-24 letters, digits or '-', start with a letter"),
        ));
    }
    Ok(())
}

/// Validates a Key Vault secret name: 1-127 chars, alphanumerics and `-`.
pub fn validate_secret_name(name: &str) -> Result<(), ReferenceError> {
    let len_ok = (1..=127).contains(&name.len());
    if !len_ok || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(
            "keyvault",
            format!("secret name '{name}' must be 1-127 letters, digits or '-'"),
        ));
    }
    Ok(())
}

/// Validates an alias name: 1-64 chars of alphanumerics, `-`, `_` or `.`.
pub fn validate_alias_name(name: &str) -> Result<(), ReferenceError> {
    let len_ok = (1..=MAX_ALIAS_LEN).contains(&name.len());
    let chars_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !len_ok || !chars_ok {
        return Err(invalid(
            "alias",
            format!("alias '{name}' must be 1-{MAX_ALIAS_LEN} letters, digits, '-', '_' or '.'"),
        ));
    }
    Ok(())
}
