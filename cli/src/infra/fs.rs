//! Filesystem infrastructure — implements `SecretFs` over `std::fs`.

use std::io::Read;
use std::path::{Path, PathBuf};

use keyhole_common::SecretValue;
use zeroize::Zeroizing;

use crate::application::ports::SecretFs;

/// Production filesystem implementation of `SecretFs`.
pub struct LocalFs;

impl SecretFs for LocalFs {
    fn mode(&self, path: &Path) -> std::io::Result<Option<u32>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(mode_bits(&meta))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_secret(&self, path: &Path) -> std::io::Result<SecretValue> {
        let mut file = std::fs::File::open(path)?;
        // Sized up front so the secret is never reallocated mid-read.
        let len = file.metadata().map_or(0, |m| m.len());
        let capacity = usize::try_from(len).unwrap_or(0).saturating_add(1);
        let mut buf = Zeroizing::new(Vec::with_capacity(capacity));
        file.read_to_end(&mut buf)?;
        Ok(SecretValue::new(std::mem::take(&mut *buf)))
    }

    fn list_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(unix)]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

// Windows has no POSIX mode bits; report the strictest policy as satisfied.
#[cfg(not(unix))]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.is_dir() { 0o700 } else { 0o600 }
}

/// Expand a leading `~` or `~/` against `home`.
///
/// Returns `None` when the path needs a home directory and none is known.
#[must_use]
pub fn expand_home(path: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Some(path.to_path_buf());
    };
    home.map(|h| h.join(rest))
}
