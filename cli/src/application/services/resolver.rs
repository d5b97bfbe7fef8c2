//! Application service — resolve a reference string into a secret.
//!
//! Parses the reference, expands one level of alias, applies the default Key
//! Vault, then dispatches to exactly one backend exactly once.

use std::collections::BTreeMap;

use keyhole_common::{Scheme, SecretRef, SecretValue};

use crate::application::ports::{SecretBackend, SecretSource};
use crate::domain::config::AppConfig;
use crate::domain::error::ResolveError;

/// One backend per scheme.
pub struct Backends<P, K, E, F> {
    pub pass: P,
    pub keyvault: K,
    pub env: E,
    pub file: F,
}

/// Dispatches references to their backend.
pub struct SecretResolver<P, K, E, F> {
    backends: Backends<P, K, E, F>,
    aliases: BTreeMap<String, String>,
    default_vault: Option<String>,
}

impl<P, K, E, F> SecretResolver<P, K, E, F>
where
    P: SecretBackend,
    K: SecretBackend,
    E: SecretBackend,
    F: SecretBackend,
{
    #[must_use]
    pub fn new(backends: Backends<P, K, E, F>, config: &AppConfig) -> Self {
        Self {
            backends,
            aliases: config.aliases.clone(),
            default_vault: config.keyvault.default_vault.clone(),
        }
    }

    /// Parse `raw` into a fully-qualified backend reference.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReference` for bad syntax, unknown aliases, aliases that
    /// point at aliases, or a vault-less Key Vault reference with no default.
    pub fn parse(&self, raw: &str) -> Result<SecretRef, ResolveError> {
        let parsed = SecretRef::parse(raw).map_err(|e| ResolveError::invalid(raw, &e))?;

        let expanded = match parsed {
            SecretRef::Alias { name } => {
                let target = self.aliases.get(&name).ok_or_else(|| {
                    ResolveError::InvalidReference {
                        reference: raw.to_string(),
                        reason: format!("unknown alias '{name}'"),
                    }
                })?;
                let resolved =
                    SecretRef::parse(target).map_err(|e| ResolveError::invalid(target, &e))?;
                if resolved.is_alias() {
                    return Err(ResolveError::InvalidReference {
                        reference: raw.to_string(),
                        reason: "aliases cannot point at other aliases".to_string(),
                    });
                }
                resolved
            }
            other => other,
        };

        match expanded {
            SecretRef::KeyVault { vault: None, name } => match &self.default_vault {
                Some(vault) => Ok(SecretRef::KeyVault {
                    vault: Some(vault.clone()),
                    name,
                }),
                None => Err(ResolveError::InvalidReference {
                    reference: raw.to_string(),
                    reason: "no vault given and keyvault.default_vault is not set".to_string(),
                }),
            },
            other => Ok(other),
        }
    }

    /// Fetch an already-parsed reference from its backend.
    ///
    /// # Errors
    ///
    /// Returns whatever the backend reports; failures are never retried.
    pub async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        tracing::debug!(reference = %reference, "resolving secret");
        let result = match reference.scheme() {
            Some(Scheme::Pass) => self.backends.pass.fetch(reference).await,
            Some(Scheme::KeyVault) => self.backends.keyvault.fetch(reference).await,
            Some(Scheme::Env) => self.backends.env.fetch(reference).await,
            Some(Scheme::File) => self.backends.file.fetch(reference).await,
            None => Err(ResolveError::InvalidReference {
                reference: reference.to_string(),
                reason: "alias was not expanded".to_string(),
            }),
        };
        match &result {
            Ok(_) => tracing::debug!(reference = %reference, "secret resolved"),
            Err(e) => tracing::debug!(reference = %reference, code = e.code(), "resolution failed"),
        }
        result
    }
}

impl<P, K, E, F> SecretSource for SecretResolver<P, K, E, F>
where
    P: SecretBackend,
    K: SecretBackend,
    E: SecretBackend,
    F: SecretBackend,
{
    async fn resolve(&self, raw: &str) -> Result<SecretValue, ResolveError> {
        let reference = self.parse(raw)?;
        self.fetch(&reference).await
    }
}
