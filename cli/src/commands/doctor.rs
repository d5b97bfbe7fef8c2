//! `keyhole doctor` — tooling and permission audit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, EnvSource, SecretFs};
use crate::application::services::doctor::{DoctorInputs, run_doctor};
use crate::domain::config::AppConfig;
use crate::domain::health::CheckStatus;
use crate::infra::backends::{ProcessEnv, resolve_store_dir};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::LocalFs;

/// Run the doctor command. Exits 1 when any check fails.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (config, load_error) = match app.config_store.load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(format!("{e:#}"))),
    };
    let home = LocalFs.home_dir();
    let inputs = DoctorInputs {
        pass_program: config.pass.program.clone(),
        az_program: config.keyvault.program.clone(),
        pass_store: resolve_store_dir(&config, &ProcessEnv, home.as_deref()),
        gnupg_home: ProcessEnv
            .var_os("GNUPGHOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".gnupg"))),
        ssh_dir: home.as_ref().map(|h| h.join(".ssh")),
        config_path: app.config_store.path().ok(),
    };

    let runner = TokioCommandRunner::new(Duration::from_secs(config.timeout_secs));
    let mut report = run_doctor(&runner, &LocalFs, &app.reporter(), &inputs).await;
    if let Some(detail) = load_error {
        report.push("config parse", CheckStatus::Fail, detail);
    }

    app.renderer().render_doctor(&report)?;
    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
