//! `pass:` backend — the standard Unix password manager over GnuPG.

use std::path::PathBuf;

use keyhole_common::{SecretRef, SecretValue};
use zeroize::Zeroizing;

use super::{from_io_error, from_run_error, wrong_scheme};
use crate::application::ports::{CommandRunner, SecretBackend, SecretFs};
use crate::domain::classify::classify_pass_failure;
use crate::domain::error::ResolveError;
use crate::domain::pass_entry;
use crate::domain::permissions::Policy;

const BACKEND: &str = "pass";

/// Runs `pass show` against a checked store directory.
pub struct PassBackend<R, F> {
    runner: R,
    fs: F,
    program: String,
    store_dir: Option<PathBuf>,
}

impl<R: CommandRunner, F: SecretFs> PassBackend<R, F> {
    /// `store_dir` is `None` when no location could be worked out.
    pub fn new(runner: R, fs: F, program: impl Into<String>, store_dir: Option<PathBuf>) -> Self {
        Self {
            runner,
            fs,
            program: program.into(),
            store_dir,
        }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Store directory must exist and be private; the entry must exist.
    fn preflight(&self, reference: &SecretRef, path: &str) -> Result<PathBuf, ResolveError> {
        let store = self
            .store_dir
            .as_ref()
            .ok_or_else(|| ResolveError::StoreUnavailable {
                backend: BACKEND,
                detail: "cannot determine the password store location".to_string(),
            })?;

        match self.fs.mode(store) {
            Ok(None) => {
                return Err(ResolveError::StoreUnavailable {
                    backend: BACKEND,
                    detail: format!("password store {} does not exist", store.display()),
                });
            }
            Ok(Some(mode)) => {
                Policy::PrivateDir
                    .check(mode)
                    .map_err(|problem| ResolveError::PermissionDenied {
                        location: store.display().to_string(),
                        problem,
                    })?;
            }
            Err(e) => return Err(from_io_error(BACKEND, reference, store, &e)),
        }

        let entry = store.join(format!("{path}.gpg"));
        match self.fs.mode(&entry) {
            Ok(Some(_)) => Ok(store.clone()),
            Ok(None) => Err(ResolveError::not_found(reference)),
            Err(e) => Err(from_io_error(BACKEND, reference, &entry, &e)),
        }
    }
}

impl<R: CommandRunner, F: SecretFs> SecretBackend for PassBackend<R, F> {
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        let SecretRef::Pass { path, field } = reference else {
            return Err(wrong_scheme(BACKEND, reference));
        };
        let store = self.preflight(reference, path)?;

        let output = self
            .runner
            .run(
                &self.program,
                &["show", path.as_str()],
                &[("PASSWORD_STORE_DIR", store.as_os_str())],
            )
            .await
            .map_err(|e| from_run_error(BACKEND, e))?;

        let stdout = Zeroizing::new(output.stdout);
        if !output.status.success() {
            return Err(classify_pass_failure(
                reference,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }
        pass_entry::extract(&stdout, field.as_deref())
            .ok_or_else(|| ResolveError::not_found(reference))
    }
}
