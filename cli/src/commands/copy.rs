//! `keyhole copy` — put a secret on the clipboard for a limited time.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::SecretSource;
use crate::application::services::clipboard::copy_with_timeout;
use crate::infra::backends::build_resolver;
use crate::infra::clipboard::ArboardClipboard;

/// Arguments for the copy command.
#[derive(Args)]
pub struct CopyArgs {
    /// Secret reference
    pub reference: String,

    /// Seconds before the previous clipboard contents are restored
    /// (default: clipboard.clear_after_secs). On X11/Wayland the restored
    /// text outlives keyhole only with a clipboard manager running
    #[arg(long, value_name = "SECS")]
    pub clear_after: Option<u64>,
}

/// Run the copy command. Blocks until the clipboard has been restored.
///
/// # Errors
///
/// Returns the resolution error, or an error if the clipboard is unavailable.
pub async fn run(app: &AppContext, args: &CopyArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let secs = args
        .clear_after
        .unwrap_or(config.clipboard.clear_after_secs);
    if secs == 0 {
        anyhow::bail!("--clear-after must be at least 1 second");
    }

    let secret = build_resolver(&config).resolve(&args.reference).await?;
    let clipboard = ArboardClipboard::new()?;
    copy_with_timeout(&clipboard, &app.reporter(), &secret, Duration::from_secs(secs)).await?;
    Ok(ExitCode::SUCCESS)
}
