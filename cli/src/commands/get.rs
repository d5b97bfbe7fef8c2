//! `keyhole get` — write a secret to stdout.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::SecretSource;

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Secret reference: pass:<path>[#field], env:<NAME>, file:<path>,
    /// keyvault:[vault/]<name> or @alias
    pub reference: String,

    /// Print even when stdout is a terminal
    #[arg(long)]
    pub reveal: bool,
}

/// Run the get command. The value is written as-is, with no newline added.
///
/// # Errors
///
/// Returns the resolution error, or an error if stdout is a terminal and
/// `--reveal` was not given.
pub async fn run(app: &AppContext, args: &GetArgs) -> Result<ExitCode> {
    if app.output.is_tty && !args.reveal {
        anyhow::bail!(
            "refusing to print a secret to a terminal; pipe the output or pass --reveal"
        );
    }
    let resolver = app.resolver()?;
    let secret = resolver.resolve(&args.reference).await?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(secret.expose())
        .and_then(|()| stdout.flush())
        .context("cannot write secret to stdout")?;
    Ok(ExitCode::SUCCESS)
}
