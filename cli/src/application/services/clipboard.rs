//! Application service — copy a secret to the clipboard for a limited time.

use std::time::Duration;

use anyhow::{Context, Result};
use keyhole_common::SecretValue;
use zeroize::Zeroizing;

use crate::application::ports::{Clipboard, ProgressReporter};

/// What happened when the timer ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The previous clipboard text was put back.
    Restored,
    /// There was no previous text; the clipboard was cleared.
    Cleared,
    /// The user copied something else meanwhile; it was left alone.
    LeftAlone,
}

/// Put `secret` on the clipboard, wait `clear_after` (or Ctrl-C), then put
/// the previous contents back if the clipboard still holds the secret.
///
/// # Errors
///
/// Returns an error if the secret is not UTF-8 text or the clipboard cannot
/// be written.
pub async fn copy_with_timeout(
    clipboard: &impl Clipboard,
    reporter: &impl ProgressReporter,
    secret: &SecretValue,
    clear_after: Duration,
) -> Result<CopyOutcome> {
    let text = secret
        .expose_str()
        .context("secret is not UTF-8 text and cannot be placed on the clipboard")?;

    let previous = match clipboard.get_text() {
        Ok(previous) => previous.map(Zeroizing::new),
        Err(e) => {
            tracing::debug!(error = %e, "could not read previous clipboard contents");
            None
        }
    };

    clipboard.set_text(text)?;
    reporter.success(&format!(
        "Copied to clipboard. Clearing in {}s (Ctrl-C to clear now).",
        clear_after.as_secs()
    ));

    tokio::select! {
        () = tokio::time::sleep(clear_after) => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    let current = clipboard.get_text().unwrap_or(None).map(Zeroizing::new);
    let still_ours = current
        .as_ref()
        .is_some_and(|c| SecretValue::from(c.as_str()) == *secret);
    if !still_ours {
        reporter.warn("Clipboard changed since copy; left untouched.");
        return Ok(CopyOutcome::LeftAlone);
    }

    match previous {
        Some(previous) => {
            clipboard.set_text(&previous)?;
            reporter.success("Clipboard restored.");
            Ok(CopyOutcome::Restored)
        }
        None => {
            clipboard.clear()?;
            reporter.success("Clipboard cleared.");
            Ok(CopyOutcome::Cleared)
        }
    }
}
