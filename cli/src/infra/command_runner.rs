//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use zeroize::Zeroizing;

use crate::application::ports::{ChildExit, ChildSpec, CommandRunner, RunError};

/// Default timeout for backend CLI calls (`pass show`, `az keyvault secret show`).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

const CAPTURE_CHUNK: usize = 4096;

/// Read a pipe to EOF. The buffer grows by copying into a fresh allocation so
/// every superseded buffer is zeroized instead of being left to the allocator.
async fn capture(handle: Option<impl AsyncRead + Unpin>) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(CAPTURE_CHUNK));
    let Some(mut handle) = handle else {
        return buf;
    };
    let mut chunk = Zeroizing::new([0u8; CAPTURE_CHUNK]);
    loop {
        let n = match handle.read(&mut chunk[..]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        if buf.len() + n > buf.capacity() {
            let mut grown = Zeroizing::new(Vec::with_capacity(
                (buf.capacity() * 2).max(buf.len() + n),
            ));
            grown.extend_from_slice(&buf);
            buf = grown;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    buf
}

/// Production `CommandRunner` — uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// `tokio::time::timeout` around `.output().await` drops the future but does
/// not kill the OS process on every platform. This implementation uses
/// `tokio::select!` with explicit `child.kill()` so the process is terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &OsStr)],
        timeout: Duration,
    ) -> Result<Output, RunError> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, mut stdout, mut stderr) = tokio::join!(
                    child.wait(),
                    capture(stdout_handle),
                    capture(stderr_handle),
                );
                Ok(Output {
                    status: status.map_err(|source| RunError::Wait {
                        program: program.to_string(),
                        source,
                    })?,
                    stdout: std::mem::take(&mut *stdout),
                    stderr: std::mem::take(&mut *stderr),
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(RunError::TimedOut { program: program.to_string(), timeout })
            }
        }
    }

    async fn run_child(&self, spec: &ChildSpec<'_>) -> Result<ChildExit, RunError> {
        let mut command = tokio::process::Command::new(spec.program);
        command
            .args(spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_os_str())))
            .kill_on_drop(true);
        if spec.stdin.is_some() {
            command.stdin(Stdio::piped());
        }
        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.to_string(),
            source,
        })?;

        let stdin_handle = child.stdin.take();
        let feed = async {
            if let (Some(mut stdin), Some(input)) = (stdin_handle, spec.stdin) {
                // The child may exit without reading; a broken pipe is not an error.
                let _ = stdin.write_all(input).await;
                let _ = stdin.shutdown().await;
            }
        };

        tokio::select! {
            result = async {
                let ((), status) = tokio::join!(feed, child.wait());
                status
            } => result
                .map(ChildExit::Exited)
                .map_err(|source| RunError::Wait { program: spec.program.to_string(), source }),
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::debug!(program = spec.program, "interrupted, killing child");
                let _ = child.kill().await;
                Ok(ChildExit::Interrupted)
            }
        }
    }
}
