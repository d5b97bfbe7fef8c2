//! `file:` backend — a private file on local disk.

use keyhole_common::{SecretRef, SecretValue};

use super::{from_io_error, wrong_scheme};
use crate::application::ports::{SecretBackend, SecretFs};
use crate::domain::error::ResolveError;
use crate::domain::permissions::Policy;
use crate::infra::fs::expand_home;

const BACKEND: &str = "file";

pub struct FileBackend<F> {
    fs: F,
}

impl<F: SecretFs> FileBackend<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: SecretFs> SecretBackend for FileBackend<F> {
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        let SecretRef::File { path } = reference else {
            return Err(wrong_scheme(BACKEND, reference));
        };
        let path = expand_home(path, self.fs.home_dir().as_deref()).ok_or_else(|| {
            ResolveError::StoreUnavailable {
                backend: BACKEND,
                detail: "cannot determine home directory".to_string(),
            }
        })?;

        match self.fs.mode(&path) {
            Ok(Some(mode)) => {
                Policy::PrivateFile
                    .check(mode)
                    .map_err(|problem| ResolveError::PermissionDenied {
                        location: path.display().to_string(),
                        problem,
                    })?;
            }
            Ok(None) => return Err(ResolveError::not_found(reference)),
            Err(e) => return Err(from_io_error(BACKEND, reference, &path, &e)),
        }

        self.fs
            .read_secret(&path)
            .map(SecretValue::into_trimmed)
            .map_err(|e| from_io_error(BACKEND, reference, &path, &e))
    }
}
