//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use keyhole_common::ReferenceError;
use thiserror::Error;

// ── Resolution errors ─────────────────────────────────────────────────────────

/// Why a store could not be unlocked for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptCause {
    /// No GPG private key for any recipient of the entry.
    NoSecretKey,
    /// The encryption key (or subkey) has expired.
    KeyExpired,
    /// Wrong passphrase, or the pinentry prompt was cancelled.
    BadPassphrase,
    /// gpg-agent or pinentry could not be reached.
    AgentUnavailable,
    /// The Azure CLI has no valid login session.
    NotLoggedIn,
    /// Anything the classifier does not recognise; carries the first stderr line.
    Other(String),
}

impl fmt::Display for DecryptCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptCause::NoSecretKey => f.write_str("no secret key available for this entry"),
            DecryptCause::KeyExpired => f.write_str("the encryption key has expired"),
            DecryptCause::BadPassphrase => {
                f.write_str("the key passphrase was rejected or the prompt was cancelled")
            }
            DecryptCause::AgentUnavailable => f.write_str("gpg-agent or pinentry is not reachable"),
            DecryptCause::NotLoggedIn => f.write_str("the Azure CLI has no valid login"),
            DecryptCause::Other(detail) => f.write_str(detail),
        }
    }
}

/// What is wrong with the permissions guarding a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionProblem {
    /// Group or other access bits are set.
    TooPermissive { mode: u32, max: u32 },
    /// The owner lacks the bits the backend needs.
    TooRestrictive { mode: u32, needed: u32 },
    /// The OS (or the remote access policy) refused access.
    Denied,
}

impl fmt::Display for PermissionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionProblem::TooPermissive { mode, max } => write!(
                f,
                "mode {mode:04o} grants group/other access (expected at most {max:04o})"
            ),
            PermissionProblem::TooRestrictive { mode, needed } => write!(
                f,
                "mode {mode:04o} is too restrictive (owner needs at least {needed:04o})"
            ),
            PermissionProblem::Denied => f.write_str("access denied"),
        }
    }
}

/// Failure to turn a reference into a secret value.
///
/// Every variant is surfaced immediately; nothing here is ever retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("secret not found: {reference}")]
    NotFound { reference: String },

    #[error("cannot decrypt {reference}: {cause}")]
    DecryptionFailed { reference: String, cause: DecryptCause },

    #[error("permission problem on {location}: {problem}")]
    PermissionDenied {
        location: String,
        problem: PermissionProblem,
    },

    #[error("{backend} store unavailable: {detail}")]
    StoreUnavailable { backend: &'static str, detail: String },

    #[error("{backend} did not answer within {secs}s")]
    Timeout { backend: &'static str, secs: u64 },
}

impl ResolveError {
    /// Build an `InvalidReference` from a parse failure.
    #[must_use]
    pub fn invalid(reference: &str, err: &ReferenceError) -> Self {
        ResolveError::InvalidReference {
            reference: reference.to_string(),
            reason: err.to_string(),
        }
    }

    /// `NotFound` for the given reference.
    pub fn not_found(reference: impl fmt::Display) -> Self {
        ResolveError::NotFound {
            reference: reference.to_string(),
        }
    }

    /// Stable machine-readable code used in JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::InvalidReference { .. } => "invalid_reference",
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::DecryptionFailed { .. } => "decryption_failed",
            ResolveError::PermissionDenied { .. } => "permission_denied",
            ResolveError::StoreUnavailable { .. } => "store_unavailable",
            ResolveError::Timeout { .. } => "timeout",
        }
    }

    /// Process exit code for this failure class.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            ResolveError::NotFound { .. } => 2,
            ResolveError::DecryptionFailed { .. } => 3,
            ResolveError::PermissionDenied { .. } => 4,
            ResolveError::InvalidReference { .. } => 5,
            ResolveError::StoreUnavailable { .. } => 6,
            ResolveError::Timeout { .. } => 7,
        }
    }

    /// Operator hint. Distinguishes rotating a key from fixing permissions
    /// from reconfiguring the store location.
    #[must_use]
    pub fn remediation(&self) -> String {
        match self {
            ResolveError::InvalidReference { .. } => {
                "fix the reference: pass:<path>[#field], env:<NAME>, file:<path>, \
                 keyvault:[vault/]<name> or @alias"
                    .to_string()
            }
            ResolveError::NotFound { .. } => {
                "check the reference name (e.g. `pass ls`, `az keyvault secret list`)".to_string()
            }
            ResolveError::DecryptionFailed { cause, .. } => decrypt_remediation(cause),
            ResolveError::PermissionDenied { location, problem } => {
                permission_remediation(location, *problem)
            }
            ResolveError::StoreUnavailable { backend, .. } => format!(
                "reconfigure store location: check `keyhole config show` and that the \
                 {backend} tooling is installed"
            ),
            ResolveError::Timeout { .. } => {
                "the backend may be waiting on a prompt; unlock it interactively first \
                 or raise timeout_secs"
                    .to_string()
            }
        }
    }
}

fn decrypt_remediation(cause: &DecryptCause) -> String {
    match cause {
        DecryptCause::NoSecretKey => {
            "import the private key the store is encrypted for (`gpg --import`)".to_string()
        }
        DecryptCause::KeyExpired => {
            "rotate the key: extend it (`gpg --quick-set-expire`) or re-encrypt with \
             `pass init <new-key-id>`"
                .to_string()
        }
        DecryptCause::BadPassphrase => {
            "unlock the key in gpg-agent yourself; keyhole never retries a passphrase".to_string()
        }
        DecryptCause::AgentUnavailable => {
            "start gpg-agent and configure a pinentry (export GPG_TTY=$(tty))".to_string()
        }
        DecryptCause::NotLoggedIn => {
            "run `az login` or refresh the service principal credentials".to_string()
        }
        DecryptCause::Other(_) => "check the backend's own diagnostics".to_string(),
    }
}

fn permission_remediation(location: &str, problem: PermissionProblem) -> String {
    match problem {
        PermissionProblem::TooPermissive { max, .. } => {
            format!("fix permissions: chmod {max:o} {location}")
        }
        PermissionProblem::TooRestrictive { needed, .. } => {
            let bits = if needed & 0o100 == 0 { "r" } else { "rx" };
            format!("fix permissions: chmod u+{bits} {location}")
        }
        PermissionProblem::Denied => format!(
            "fix permissions: the current identity may not read {location} \
             (file ownership, or the vault access policy / RBAC role)"
        ),
    }
}

// ── Injection errors ──────────────────────────────────────────────────────────

/// Errors in `exec` bindings, detected before anything is resolved.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("invalid binding '{0}': expected VAR=REFERENCE")]
    MalformedBinding(String),

    #[error("invalid environment variable name '{0}'")]
    InvalidVarName(String),

    #[error("environment variable '{0}' is bound more than once")]
    DuplicateVar(String),

    #[error("no program given to run")]
    MissingProgram,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
