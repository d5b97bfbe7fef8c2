//! `keyhole check` — verify that references resolve, without showing values.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::SecretSource;
use crate::domain::health::ReferenceCheck;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// References to resolve
    #[arg(required = true, value_name = "REF")]
    pub references: Vec<String>,
}

/// Resolve every reference in order, then report.
///
/// Exits with the exit code of the first failing reference.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub async fn run(app: &AppContext, args: &CheckArgs) -> Result<ExitCode> {
    let resolver = app.resolver()?;
    let mut checks = Vec::with_capacity(args.references.len());
    let mut first_failure = None;

    for raw in &args.references {
        match resolver.resolve(raw).await {
            Ok(_) => checks.push(ReferenceCheck::passed(raw)),
            Err(e) => {
                first_failure.get_or_insert(e.exit_code());
                checks.push(ReferenceCheck::failed(raw, &e));
            }
        }
    }

    app.renderer().render_checks(&checks)?;
    Ok(first_failure.map_or(ExitCode::SUCCESS, ExitCode::from))
}
