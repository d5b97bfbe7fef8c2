//! `keyhole exec` — run a program with secrets injected.

use std::process::{ExitCode, ExitStatus};

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ChildExit;
use crate::application::services::inject::{Binding, InjectionPlan, run_injected};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::scoped_file::TempSecretFiles;

/// Exit code when the user interrupts `exec` with Ctrl-C.
pub const INTERRUPTED_EXIT: u8 = 130;

/// Arguments for the exec command.
#[derive(Args)]
pub struct ExecArgs {
    /// Export a secret as an environment variable
    #[arg(long = "env", value_name = "VAR=REF", value_parser = Binding::parse)]
    pub env: Vec<Binding>,

    /// Write a secret to a scoped file and export its path in VAR
    #[arg(long = "file", value_name = "VAR=REF", value_parser = Binding::parse)]
    pub file: Vec<Binding>,

    /// Pipe a secret to the program's stdin
    #[arg(long, value_name = "REF")]
    pub stdin: Option<String>,

    /// Program and arguments, after `--`
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Run the exec command and propagate the child's exit code.
///
/// # Errors
///
/// Returns an error if a binding is invalid, a reference fails to resolve
/// (the program is not started), or the program cannot be spawned.
pub async fn run(app: &AppContext, args: ExecArgs) -> Result<ExitCode> {
    let plan = InjectionPlan::new(args.env, args.file, args.stdin, args.command)?;
    let resolver = app.resolver()?;
    let runner = TokioCommandRunner::default();
    let writer = TempSecretFiles::new();

    let exit = run_injected(&resolver, &writer, &runner, &plan).await?;
    if exit == ChildExit::Interrupted {
        app.output.warn(&format!("interrupted; {} was terminated", plan.program));
    }
    Ok(ExitCode::from(exit_code_for(exit)))
}

/// Map how the child ended to keyhole's own exit code.
#[must_use]
pub fn exit_code_for(exit: ChildExit) -> u8 {
    match exit {
        ChildExit::Interrupted => INTERRUPTED_EXIT,
        ChildExit::Exited(status) => status_code(status),
    }
}

fn status_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(1);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(1);
        }
    }
    1
}
