//! Secret store backends — one `SecretBackend` implementation per scheme.
//!
//! Also wires the production resolver and the library entry point
//! [`resolve_secret`].

pub mod env;
pub mod file;
pub mod keyvault;
pub mod pass;

use std::path::{Path, PathBuf};

use keyhole_common::{SecretRef, SecretValue};

use crate::application::ports::{ConfigStore, EnvSource, RunError, SecretFs, SecretSource};
use crate::application::services::resolver::{Backends, SecretResolver};
use crate::domain::config::AppConfig;
use crate::domain::error::{PermissionProblem, ResolveError};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::{LocalFs, expand_home};

pub use env::{EnvBackend, ProcessEnv};
pub use file::FileBackend;
pub use keyvault::KeyVaultBackend;
pub use pass::PassBackend;

/// Resolver wired to the real tools, environment and filesystem.
pub type ProductionResolver = SecretResolver<
    PassBackend<TokioCommandRunner, LocalFs>,
    KeyVaultBackend<TokioCommandRunner>,
    EnvBackend<ProcessEnv>,
    FileBackend<LocalFs>,
>;

/// Build the production resolver from configuration.
#[must_use]
pub fn build_resolver(config: &AppConfig) -> ProductionResolver {
    let timeout = config.timeout();
    let store_dir = resolve_store_dir(config, &ProcessEnv, LocalFs.home_dir().as_deref());
    let backends = Backends {
        pass: PassBackend::new(
            TokioCommandRunner::new(timeout),
            LocalFs,
            config.pass.program.clone(),
            store_dir,
        ),
        keyvault: KeyVaultBackend::new(
            TokioCommandRunner::new(timeout),
            config.keyvault.program.clone(),
        ),
        env: EnvBackend::new(ProcessEnv),
        file: FileBackend::new(LocalFs),
    };
    SecretResolver::new(backends, config)
}

/// Resolve `reference` to its secret value using the configuration on disk.
///
/// This is the library entry point: callers get a [`SecretValue`] or a typed
/// [`ResolveError`] naming the failure class.
///
/// # Errors
///
/// Returns a [`ResolveError`]; an unreadable configuration file is reported
/// as `StoreUnavailable` for the `config` backend.
pub async fn resolve_secret(reference: &str) -> Result<SecretValue, ResolveError> {
    let config = YamlConfigStore::default()
        .load()
        .map_err(|e| ResolveError::StoreUnavailable {
            backend: "config",
            detail: format!("{e:#}"),
        })?;
    build_resolver(&config).resolve(reference).await
}

/// Password store directory: `pass.store_dir`, then `PASSWORD_STORE_DIR`,
/// then `~/.password-store`.
#[must_use]
pub fn resolve_store_dir(
    config: &AppConfig,
    env: &impl EnvSource,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(dir) = &config.pass.store_dir {
        return expand_home(Path::new(dir), home);
    }
    if let Some(dir) = env.var_os("PASSWORD_STORE_DIR").filter(|v| !v.is_empty()) {
        return expand_home(Path::new(&dir), home);
    }
    home.map(|h| h.join(".password-store"))
}

/// Map a process failure to the resolution error for `backend`.
pub(crate) fn from_run_error(backend: &'static str, err: RunError) -> ResolveError {
    match err {
        RunError::Spawn { program, source } if source.kind() == std::io::ErrorKind::NotFound => {
            ResolveError::StoreUnavailable {
                backend,
                detail: format!("{program} not found on PATH"),
            }
        }
        RunError::TimedOut { timeout, .. } => ResolveError::Timeout {
            backend,
            secs: timeout.as_secs(),
        },
        other => ResolveError::StoreUnavailable {
            backend,
            detail: other.to_string(),
        },
    }
}

/// Map a filesystem failure while reading `location` for `reference`.
pub(crate) fn from_io_error(
    backend: &'static str,
    reference: &SecretRef,
    location: &Path,
    err: &std::io::Error,
) -> ResolveError {
    match err.kind() {
        std::io::ErrorKind::NotFound => ResolveError::not_found(reference),
        std::io::ErrorKind::PermissionDenied => ResolveError::PermissionDenied {
            location: location.display().to_string(),
            problem: PermissionProblem::Denied,
        },
        _ => ResolveError::StoreUnavailable {
            backend,
            detail: format!("{}: {err}", location.display()),
        },
    }
}

/// The resolver only hands a backend references of its own scheme.
pub(crate) fn wrong_scheme(backend: &'static str, reference: &SecretRef) -> ResolveError {
    ResolveError::InvalidReference {
        reference: reference.to_string(),
        reason: format!("not a {backend} reference"),
    }
}
