//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `keyhole_common` — never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use keyhole_common::{SecretRef, SecretValue};
use thiserror::Error;

use crate::domain::config::AppConfig;
use crate::domain::error::ResolveError;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Why a spawned process did not produce an `Output`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A child process that inherits the terminal, with secrets injected.
pub struct ChildSpec<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    /// Variables added on top of the inherited environment.
    pub envs: Vec<(String, OsString)>,
    /// Bytes piped to the child's stdin, which is then closed.
    pub stdin: Option<&'a [u8]>,
}

/// How an interactive child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Exited(ExitStatus),
    /// keyhole received Ctrl-C and killed the child.
    Interrupted,
}

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Timeout applied by [`CommandRunner::run`].
    fn default_timeout(&self) -> Duration;

    /// Run a program with extra environment variables and capture its output.
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &OsStr)],
    ) -> Result<Output, RunError> {
        self.run_with_timeout(program, args, envs, self.default_timeout())
            .await
    }

    /// Run a program with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &OsStr)],
        timeout: Duration,
    ) -> Result<Output, RunError>;

    /// Run a child with inherited stdout/stderr and wait for it, killing it
    /// if the user interrupts.
    async fn run_child(&self, spec: &ChildSpec<'_>) -> Result<ChildExit, RunError>;
}

// ── Secret Ports ──────────────────────────────────────────────────────────────

/// One secret store.
#[allow(async_fn_in_trait)]
pub trait SecretBackend {
    /// Fetch the secret named by `reference`. Called once per resolution;
    /// implementations must not retry.
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError>;
}

/// Anything that can turn a raw reference string into a secret.
#[allow(async_fn_in_trait)]
pub trait SecretSource {
    async fn resolve(&self, raw: &str) -> Result<SecretValue, ResolveError>;
}

/// Read access to the process environment.
pub trait EnvSource {
    fn var_os(&self, name: &str) -> Option<OsString>;
}

/// Filesystem access needed by the file and pass backends and the doctor.
pub trait SecretFs {
    /// Permission bits of `path` (following symlinks), `None` if it does not exist.
    fn mode(&self, path: &Path) -> std::io::Result<Option<u32>>;
    /// Read a file's full contents.
    fn read_secret(&self, path: &Path) -> std::io::Result<SecretValue>;
    /// Entries directly inside `path`.
    fn list_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>>;
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Writes a secret to a file that lives exactly as long as the returned guard.
pub trait SecretFileWriter {
    /// Deletes the file when dropped.
    type Guard: AsRef<Path>;

    /// Write `secret` to a new private file named after `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn materialise(&self, label: &str, secret: &SecretValue) -> Result<Self::Guard>;
}

/// System clipboard.
pub trait Clipboard {
    /// Current text, `None` if the clipboard holds no text.
    fn get_text(&self) -> Result<Option<String>>;
    fn set_text(&self, text: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<AppConfig>;
    /// Persist configuration with owner-only permissions.
    fn save(&self, config: &AppConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
