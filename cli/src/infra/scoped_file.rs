//! Scoped secret files for `exec --file`.
//!
//! Each secret gets its own private temp directory (0700) holding one file
//! (0600). Dropping the guard overwrites the file with zeros, removes it and
//! then removes the directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keyhole_common::SecretValue;
use tempfile::TempDir;

use crate::application::ports::SecretFileWriter;

/// Creates [`ScopedSecretFile`]s, under `$XDG_RUNTIME_DIR` when it exists.
pub struct TempSecretFiles {
    base: Option<PathBuf>,
}

impl TempSecretFiles {
    #[must_use]
    pub fn new() -> Self {
        let base = std::env::var_os("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .filter(|p| p.is_dir());
        Self { base }
    }

    /// Place scoped files under `base` instead.
    #[must_use]
    pub fn in_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }
}

impl Default for TempSecretFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretFileWriter for TempSecretFiles {
    type Guard = ScopedSecretFile;

    fn materialise(&self, label: &str, secret: &SecretValue) -> Result<ScopedSecretFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("keyhole-");
        let dir = match &self.base {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
        .context("cannot create private temp directory")?;
        restrict(dir.path(), 0o700)?;

        let path = dir.path().join(label.to_ascii_lowercase());
        let mut file = open_private(&path)?;
        file.write_all(secret.expose())
            .and_then(|()| file.sync_all())
            .with_context(|| format!("cannot write {}", path.display()))?;

        tracing::debug!(path = %path.display(), "scoped secret file created");
        Ok(ScopedSecretFile {
            path,
            len: secret.len(),
            _dir: dir,
        })
    }
}

/// A secret on disk that lives exactly as long as this value.
#[derive(Debug)]
pub struct ScopedSecretFile {
    path: PathBuf,
    len: usize,
    // Dropped after `Drop::drop` runs, removing the directory.
    _dir: TempDir,
}

impl ScopedSecretFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ScopedSecretFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedSecretFile {
    fn drop(&mut self) {
        if let Ok(mut file) = std::fs::OpenOptions::new().write(true).open(&self.path) {
            let _ = file.write_all(&vec![0u8; self.len]);
            let _ = file.sync_all();
        }
        let _ = std::fs::remove_file(&self.path);
        tracing::debug!(path = %self.path.display(), "scoped secret file removed");
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("cannot set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
