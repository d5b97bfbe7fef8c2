//! Shared mock infrastructure for unit tests.
//!
//! Hand-written implementations of the application ports so each test file
//! doesn't have to re-define the same boilerplate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ffi::{OsStr, OsString};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use keyhole_cli::application::ports::{
    ChildExit, ChildSpec, Clipboard, CommandRunner, EnvSource, ProgressReporter, RunError,
    SecretBackend, SecretFileWriter, SecretFs, SecretSource,
};
use keyhole_cli::domain::error::ResolveError;
use keyhole_common::{SecretRef, SecretValue};

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(stderr: &[u8]) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

pub fn spawn_not_found(program: &str) -> RunError {
    RunError::Spawn {
        program: program.to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

// ── Mock: scripted command runner ─────────────────────────────────────────────

/// One captured `run_with_timeout` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, OsString)>,
}

/// One captured `run_child` call.
#[derive(Debug, Clone)]
pub struct RecordedChild {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, OsString)>,
    pub stdin: Option<Vec<u8>>,
}

/// Replies to `run_with_timeout` calls in order; an exhausted script behaves
/// as if the program is not installed.
pub struct ScriptedRunner {
    replies: Mutex<VecDeque<Result<Output, RunError>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub children: Mutex<Vec<RecordedChild>>,
    child_exit: ChildExit,
}

impl ScriptedRunner {
    pub fn new(replies: Vec<Result<Output, RunError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            child_exit: ChildExit::Exited(exit_status(0)),
        }
    }

    pub fn with_child_exit(mut self, exit: ChildExit) -> Self {
        self.child_exit = exit;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls.lock().unwrap().last().cloned().expect("no calls recorded")
    }
}

impl CommandRunner for ScriptedRunner {
    fn default_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &OsStr)],
        _timeout: Duration,
    ) -> Result<Output, RunError> {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            envs: envs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_os_string()))
                .collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(spawn_not_found(program)))
    }

    async fn run_child(&self, spec: &ChildSpec<'_>) -> Result<ChildExit, RunError> {
        self.children.lock().unwrap().push(RecordedChild {
            program: spec.program.to_string(),
            args: spec.args.to_vec(),
            envs: spec.envs.clone(),
            stdin: spec.stdin.map(<[u8]>::to_vec),
        });
        Ok(self.child_exit)
    }
}

// ── Mock: environment ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var_os(&self, name: &str) -> Option<OsString> {
        self.0.get(name).map(OsString::from)
    }
}

// ── Mock: in-memory filesystem ────────────────────────────────────────────────

struct MemEntry {
    mode: u32,
    content: Option<Vec<u8>>,
    read_error: Option<std::io::ErrorKind>,
}

/// Paths with modes and contents. Directories have no content.
#[derive(Default)]
pub struct MemFs {
    entries: BTreeMap<PathBuf, MemEntry>,
    home: Option<PathBuf>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn home(mut self, home: &str) -> Self {
        self.home = Some(PathBuf::from(home));
        self
    }

    pub fn dir(mut self, path: &str, mode: u32) -> Self {
        self.entries.insert(
            PathBuf::from(path),
            MemEntry {
                mode: 0o040_000 | mode,
                content: None,
                read_error: None,
            },
        );
        self
    }

    pub fn file(mut self, path: &str, mode: u32, content: &[u8]) -> Self {
        self.entries.insert(
            PathBuf::from(path),
            MemEntry {
                mode: 0o100_000 | mode,
                content: Some(content.to_vec()),
                read_error: None,
            },
        );
        self
    }

    /// A file whose mode looks fine but whose read fails with `kind`.
    pub fn unreadable(mut self, path: &str, mode: u32, kind: std::io::ErrorKind) -> Self {
        self.entries.insert(
            PathBuf::from(path),
            MemEntry {
                mode: 0o100_000 | mode,
                content: None,
                read_error: Some(kind),
            },
        );
        self
    }
}

impl SecretFs for MemFs {
    fn mode(&self, path: &Path) -> std::io::Result<Option<u32>> {
        Ok(self.entries.get(path).map(|e| e.mode))
    }

    fn read_secret(&self, path: &Path) -> std::io::Result<SecretValue> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))?;
        if let Some(kind) = entry.read_error {
            return Err(std::io::Error::from(kind));
        }
        entry
            .content
            .clone()
            .map(SecretValue::new)
            .ok_or_else(|| std::io::Error::other("is a directory"))
    }

    fn list_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        Ok(self
            .entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

// ── Mock: scoped file writer ──────────────────────────────────────────────────

/// Records what would have been written; guards record their own drop.
#[derive(Default)]
pub struct RecordingWriter {
    pub written: Mutex<Vec<(String, Vec<u8>)>>,
    pub dropped: Arc<Mutex<Vec<PathBuf>>>,
}

pub struct RecordingGuard {
    path: PathBuf,
    dropped: Arc<Mutex<Vec<PathBuf>>>,
}

impl AsRef<Path> for RecordingGuard {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for RecordingGuard {
    fn drop(&mut self) {
        self.dropped.lock().unwrap().push(self.path.clone());
    }
}

impl SecretFileWriter for RecordingWriter {
    type Guard = RecordingGuard;

    fn materialise(&self, label: &str, secret: &SecretValue) -> Result<RecordingGuard> {
        self.written
            .lock()
            .unwrap()
            .push((label.to_string(), secret.expose().to_vec()));
        Ok(RecordingGuard {
            path: PathBuf::from(format!("/run/keyhole-test/{}", label.to_ascii_lowercase())),
            dropped: Arc::clone(&self.dropped),
        })
    }
}

// ── Mock: secret sources and backends ─────────────────────────────────────────

/// Resolves from a fixed table; anything else is `NotFound`.
#[derive(Default)]
pub struct TableSource {
    values: HashMap<String, String>,
    pub resolved: Mutex<Vec<String>>,
}

impl TableSource {
    pub fn with(mut self, reference: &str, value: &str) -> Self {
        self.values.insert(reference.to_string(), value.to_string());
        self
    }
}

impl SecretSource for TableSource {
    async fn resolve(&self, raw: &str) -> Result<SecretValue, ResolveError> {
        self.resolved.lock().unwrap().push(raw.to_string());
        self.values
            .get(raw)
            .map(|v| SecretValue::from(v.as_str()))
            .ok_or_else(|| ResolveError::not_found(raw))
    }
}

/// Returns a fixed value and records every reference it was asked for.
pub struct FixedBackend {
    value: &'static str,
    pub seen: Mutex<Vec<String>>,
}

impl FixedBackend {
    pub fn new(value: &'static str) -> Self {
        Self {
            value,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl SecretBackend for FixedBackend {
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        self.seen.lock().unwrap().push(reference.to_string());
        Ok(SecretValue::from(self.value))
    }
}

// ── Mock: clipboard ───────────────────────────────────────────────────────────

/// In-memory clipboard. With `hijack`, the first `set_text` is immediately
/// overwritten, as if the user copied something else.
#[derive(Default)]
pub struct MemClipboard {
    pub content: Mutex<Option<String>>,
    hijack: Option<String>,
    pub sets: Mutex<usize>,
}

impl MemClipboard {
    pub fn holding(text: &str) -> Self {
        Self {
            content: Mutex::new(Some(text.to_string())),
            ..Self::default()
        }
    }

    pub fn hijacked_by(mut self, text: &str) -> Self {
        self.hijack = Some(text.to_string());
        self
    }

    pub fn current(&self) -> Option<String> {
        self.content.lock().unwrap().clone()
    }
}

impl Clipboard for MemClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let mut sets = self.sets.lock().unwrap();
        *sets += 1;
        let value = match (&self.hijack, *sets) {
            (Some(other), 1) => other.clone(),
            _ => text.to_string(),
        };
        *self.content.lock().unwrap() = Some(value);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.content.lock().unwrap() = None;
        Ok(())
    }
}

// ── Mock: progress reporters ──────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("warn: {message}"));
    }
}
