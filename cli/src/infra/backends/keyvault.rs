//! `keyvault:` backend — Azure Key Vault through the `az` CLI.

use keyhole_common::{SecretRef, SecretValue};

use super::{from_run_error, wrong_scheme};
use crate::application::ports::{CommandRunner, SecretBackend};
use crate::domain::classify::classify_keyvault_failure;
use crate::domain::error::ResolveError;

const BACKEND: &str = "keyvault";

/// Runs `az keyvault secret show` with the caller's existing login.
pub struct KeyVaultBackend<R> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> KeyVaultBackend<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> SecretBackend for KeyVaultBackend<R> {
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        let SecretRef::KeyVault {
            vault: Some(vault),
            name,
        } = reference
        else {
            return Err(wrong_scheme(BACKEND, reference));
        };

        let output = self
            .runner
            .run(
                &self.program,
                &[
                    "keyvault",
                    "secret",
                    "show",
                    "--vault-name",
                    vault.as_str(),
                    "--name",
                    name.as_str(),
                    "--query",
                    "value",
                    "-o",
                    "tsv",
                ],
                &[],
            )
            .await
            .map_err(|e| from_run_error(BACKEND, e))?;

        let secret = SecretValue::from_output_bytes(output.stdout);
        if !output.status.success() {
            return Err(classify_keyvault_failure(
                reference,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }
        if secret.is_empty() {
            return Err(ResolveError::not_found(reference));
        }
        Ok(secret)
    }
}
