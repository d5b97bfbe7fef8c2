//! Application service — tooling and permission audit.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::ports::{CommandRunner, ProgressReporter, RunError, SecretFs};
use crate::domain::health::{CheckStatus, DoctorReport, evaluate_mode};
use crate::domain::permissions::Policy;

const TOOL_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths and programs the doctor inspects, worked out by the caller.
#[derive(Debug, Clone, Default)]
pub struct DoctorInputs {
    pub pass_program: String,
    pub az_program: String,
    pub pass_store: Option<PathBuf>,
    pub gnupg_home: Option<PathBuf>,
    pub ssh_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Run every check and collect the results.
///
/// Individual probe failures become `warn`/`fail` entries; the audit itself
/// never aborts.
pub async fn run_doctor(
    runner: &impl CommandRunner,
    fs: &impl SecretFs,
    reporter: &impl ProgressReporter,
    inputs: &DoctorInputs,
) -> DoctorReport {
    let mut report = DoctorReport::default();

    reporter.step("checking tools...");
    for (name, program, args) in [
        ("pass", inputs.pass_program.as_str(), &["--version"][..]),
        ("gpg", "gpg", &["--version"][..]),
        ("az", inputs.az_program.as_str(), &["version"][..]),
    ] {
        let (status, detail) = probe_tool(runner, program, args).await;
        report.push(format!("tool: {name}"), status, detail);
    }

    reporter.step("checking permissions...");
    check_dir(&mut report, fs, "pass store", inputs.pass_store.as_deref());
    check_dir(&mut report, fs, "gnupg home", inputs.gnupg_home.as_deref());
    check_dir(&mut report, fs, "ssh dir", inputs.ssh_dir.as_deref());
    if let Some(ssh_dir) = &inputs.ssh_dir {
        check_ssh_keys(&mut report, fs, ssh_dir);
    }
    if let Some(config) = &inputs.config_path {
        let location = config.display().to_string();
        match fs.mode(config) {
            Ok(None) => report.push("config file", CheckStatus::Ok, format!("{location} not created yet")),
            Ok(mode) => {
                let (status, detail) = evaluate_mode(&location, mode, Policy::PrivateFile, CheckStatus::Ok);
                report.push("config file", status, detail);
            }
            Err(e) => report.push("config file", CheckStatus::Fail, format!("{location}: {e}")),
        }
    }

    reporter.success("diagnostics complete");
    report
}

async fn probe_tool(runner: &impl CommandRunner, program: &str, args: &[&str]) -> (CheckStatus, String) {
    match runner.run_with_timeout(program, args, &[], TOOL_PROBE_TIMEOUT).await {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let first = stdout.lines().map(str::trim).find(|l| !l.is_empty());
            match first {
                Some(line) if !line.starts_with('{') => (CheckStatus::Ok, line.to_string()),
                _ => (CheckStatus::Ok, format!("{program} installed")),
            }
        }
        Ok(output) => (
            CheckStatus::Warn,
            format!("{program} exited with {}", output.status),
        ),
        Err(RunError::Spawn { .. }) => (CheckStatus::Warn, format!("{program} not found on PATH")),
        Err(e) => (CheckStatus::Warn, e.to_string()),
    }
}

fn check_dir(report: &mut DoctorReport, fs: &impl SecretFs, name: &str, path: Option<&Path>) {
    let Some(path) = path else {
        report.push(name, CheckStatus::Warn, "location could not be determined");
        return;
    };
    let location = path.display().to_string();
    match fs.mode(path) {
        Ok(mode) => {
            let (status, detail) = evaluate_mode(&location, mode, Policy::PrivateDir, CheckStatus::Warn);
            report.push(name, status, detail);
        }
        Err(e) => report.push(name, CheckStatus::Fail, format!("{location}: {e}")),
    }
}

fn check_ssh_keys(report: &mut DoctorReport, fs: &impl SecretFs, ssh_dir: &Path) {
    let Ok(entries) = fs.list_dir(ssh_dir) else {
        return;
    };
    let mut keys: Vec<PathBuf> = entries
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("id_") && !n.ends_with(".pub"))
        })
        .collect();
    keys.sort();
    for key in keys {
        let location = key.display().to_string();
        let name = format!(
            "ssh key {}",
            key.file_name().and_then(|n| n.to_str()).unwrap_or_default()
        );
        match fs.mode(&key) {
            Ok(mode) => {
                let (status, detail) = evaluate_mode(&location, mode, Policy::PrivateFile, CheckStatus::Fail);
                report.push(name, status, detail);
            }
            Err(e) => report.push(name, CheckStatus::Fail, format!("{location}: {e}")),
        }
    }
}
