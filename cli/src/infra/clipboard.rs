//! System clipboard via `arboard`.

use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::application::ports::Clipboard;

/// Production implementation of the `Clipboard` port.
///
/// On X11 and Wayland `arboard` serves the selection only while this process
/// lives; anything set last is kept after exit only by a clipboard manager.
pub struct ArboardClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl ArboardClipboard {
    /// Connect to the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if no clipboard is available (e.g. no display server).
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("cannot access the system clipboard")?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut arboard::Clipboard) -> Result<T>) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("clipboard lock poisoned"))?;
        f(&mut guard)
    }
}

impl Clipboard for ArboardClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        self.with(|cb| match cb.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e).context("cannot read clipboard"),
        })
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.with(|cb| cb.set_text(text).context("cannot write clipboard"))
    }

    fn clear(&self) -> Result<()> {
        self.with(|cb| cb.clear().context("cannot clear clipboard"))
    }
}
