//! Tests for the `doctor` application service.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use keyhole_cli::application::services::doctor::{DoctorInputs, run_doctor};
use keyhole_cli::domain::health::{CheckStatus, DoctorReport};

use crate::mocks::{MemFs, NoopReporter, ScriptedRunner, err_output, ok_output, spawn_not_found};

fn inputs() -> DoctorInputs {
    DoctorInputs {
        pass_program: "pass".into(),
        az_program: "az".into(),
        pass_store: Some(PathBuf::from("/home/dev/.password-store")),
        gnupg_home: Some(PathBuf::from("/home/dev/.gnupg")),
        ssh_dir: Some(PathBuf::from("/home/dev/.ssh")),
        config_path: Some(PathBuf::from("/home/dev/.keyhole/config.yaml")),
    }
}

fn healthy_fs() -> MemFs {
    MemFs::new()
        .dir("/home/dev/.password-store", 0o700)
        .dir("/home/dev/.gnupg", 0o700)
        .dir("/home/dev/.ssh", 0o700)
        .file("/home/dev/.ssh/id_ed25519", 0o600, b"")
        .file("/home/dev/.ssh/id_ed25519.pub", 0o644, b"")
        .file("/home/dev/.keyhole/config.yaml", 0o600, b"")
}

fn all_tools() -> ScriptedRunner {
    ScriptedRunner::new(vec![
        Ok(ok_output(b"pass: the standard unix password manager v1.7.4\n")),
        Ok(ok_output(b"gpg (GnuPG) 2.4.4\n")),
        Ok(ok_output(b"{\n  \"azure-cli\": \"2.60.0\"\n}\n")),
    ])
}

fn status_of(report: &DoctorReport, name: &str) -> CheckStatus {
    report
        .checks
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no check named {name}"))
        .status
}

#[tokio::test]
async fn test_healthy_system_has_no_failures() {
    let report = run_doctor(&all_tools(), &healthy_fs(), &NoopReporter, &inputs()).await;
    assert!(!report.has_failures(), "{report:?}");
    assert_eq!(report.count(CheckStatus::Warn), 0, "{report:?}");
    assert_eq!(status_of(&report, "ssh key id_ed25519"), CheckStatus::Ok);
    assert!(
        report.checks.iter().all(|c| !c.name.ends_with(".pub")),
        "public keys are not checked"
    );
}

#[tokio::test]
async fn test_tool_probes_report_versions() {
    let report = run_doctor(&all_tools(), &healthy_fs(), &NoopReporter, &inputs()).await;
    let gpg = report.checks.iter().find(|c| c.name == "tool: gpg").unwrap();
    assert_eq!(gpg.detail, "gpg (GnuPG) 2.4.4");
    let az = report.checks.iter().find(|c| c.name == "tool: az").unwrap();
    assert_eq!(az.detail, "az installed");
}

#[tokio::test]
async fn test_missing_tools_are_warnings_only() {
    let runner = ScriptedRunner::new(vec![
        Err(spawn_not_found("pass")),
        Ok(ok_output(b"gpg (GnuPG) 2.4.4\n")),
        Ok(err_output(b"broken")),
    ]);
    let report = run_doctor(&runner, &healthy_fs(), &NoopReporter, &inputs()).await;
    assert_eq!(status_of(&report, "tool: pass"), CheckStatus::Warn);
    assert_eq!(status_of(&report, "tool: az"), CheckStatus::Warn);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_loose_permissions_fail_with_chmod_advice() {
    let fs = MemFs::new()
        .dir("/home/dev/.password-store", 0o755)
        .dir("/home/dev/.gnupg", 0o700)
        .dir("/home/dev/.ssh", 0o700)
        .file("/home/dev/.ssh/id_rsa", 0o644, b"");
    let report = run_doctor(&all_tools(), &fs, &NoopReporter, &inputs()).await;
    assert!(report.has_failures());
    assert_eq!(status_of(&report, "pass store"), CheckStatus::Fail);
    let key = report.checks.iter().find(|c| c.name == "ssh key id_rsa").unwrap();
    assert_eq!(key.status, CheckStatus::Fail);
    assert!(key.detail.contains("chmod 600 /home/dev/.ssh/id_rsa"), "{}", key.detail);
}

#[tokio::test]
async fn test_missing_dirs_warn_and_missing_config_is_ok() {
    let report = run_doctor(&all_tools(), &MemFs::new(), &NoopReporter, &inputs()).await;
    assert_eq!(status_of(&report, "pass store"), CheckStatus::Warn);
    assert_eq!(status_of(&report, "gnupg home"), CheckStatus::Warn);
    assert_eq!(status_of(&report, "config file"), CheckStatus::Ok);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_world_readable_config_fails() {
    let fs = healthy_fs().file("/home/dev/.keyhole/config.yaml", 0o644, b"");
    let report = run_doctor(&all_tools(), &fs, &NoopReporter, &inputs()).await;
    assert_eq!(status_of(&report, "config file"), CheckStatus::Fail);
}
