//! `env:` backend — a variable of the keyhole process environment.

use std::ffi::OsString;

use keyhole_common::{SecretRef, SecretValue};

use super::wrong_scheme;
use crate::application::ports::{EnvSource, SecretBackend};
use crate::domain::error::ResolveError;

/// The real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var_os(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

pub struct EnvBackend<E> {
    env: E,
}

impl<E: EnvSource> EnvBackend<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

impl<E: EnvSource> SecretBackend for EnvBackend<E> {
    async fn fetch(&self, reference: &SecretRef) -> Result<SecretValue, ResolveError> {
        let SecretRef::Env { name } = reference else {
            return Err(wrong_scheme("env", reference));
        };
        // Set-but-empty counts as missing.
        let value = self
            .env
            .var_os(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ResolveError::not_found(reference))?;
        Ok(SecretValue::new(into_bytes(value)))
    }
}

#[cfg(unix)]
fn into_bytes(value: OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    value.into_vec()
}

#[cfg(not(unix))]
fn into_bytes(value: OsString) -> Vec<u8> {
    value.to_string_lossy().into_owned().into_bytes()
}
