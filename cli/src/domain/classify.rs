//! Classification of backend tool failures into resolution errors.
//!
//! `pass`, `gpg` and `az` report failures as free-form stderr. These functions
//! map the well-known messages onto [`ResolveError`] variants so operators get
//! a precise remediation. Raw stderr is never echoed beyond its first line.

use keyhole_common::SecretRef;

use crate::domain::error::{DecryptCause, PermissionProblem, ResolveError};

/// Map a failed `pass show` to an error.
#[must_use]
pub fn classify_pass_failure(reference: &SecretRef, stderr: &str) -> ResolveError {
    let lower = stderr.to_ascii_lowercase();
    let decrypt = |cause| ResolveError::DecryptionFailed {
        reference: reference.to_string(),
        cause,
    };

    if lower.contains("is not in the password store") {
        ResolveError::not_found(reference)
    } else if lower.contains("no secret key") {
        decrypt(DecryptCause::NoSecretKey)
    } else if lower.contains("expired") {
        decrypt(DecryptCause::KeyExpired)
    } else if lower.contains("bad passphrase") || lower.contains("operation cancelled") {
        decrypt(DecryptCause::BadPassphrase)
    } else if lower.contains("can't connect to the agent")
        || lower.contains("no pinentry")
        || lower.contains("inappropriate ioctl")
    {
        decrypt(DecryptCause::AgentUnavailable)
    } else if lower.contains("permission denied") {
        ResolveError::PermissionDenied {
            location: reference.to_string(),
            problem: PermissionProblem::Denied,
        }
    } else if lower.contains("decryption failed") {
        decrypt(DecryptCause::Other(first_line(stderr, "gpg decryption failed")))
    } else {
        ResolveError::StoreUnavailable {
            backend: "pass",
            detail: first_line(stderr, "pass exited with an error"),
        }
    }
}

/// Map a failed `az keyvault secret show` to an error.
#[must_use]
pub fn classify_keyvault_failure(reference: &SecretRef, stderr: &str) -> ResolveError {
    let lower = stderr.to_ascii_lowercase();

    if lower.contains("vaultnotfound")
        || lower.contains("could not be resolved")
        || lower.contains("failed to resolve")
        || lower.contains("not found within subscription")
    {
        ResolveError::StoreUnavailable {
            backend: "keyvault",
            detail: first_line(stderr, "vault not reachable"),
        }
    } else if lower.contains("secretnotfound") || lower.contains("was not found") {
        ResolveError::not_found(reference)
    } else if lower.contains("forbidden")
        || lower.contains("does not have secrets get permission")
        || lower.contains("authorizationfailed")
    {
        ResolveError::PermissionDenied {
            location: reference.to_string(),
            problem: PermissionProblem::Denied,
        }
    } else if lower.contains("az login")
        || lower.contains("aadsts")
        || lower.contains("token has expired")
        || lower.contains("refresh token")
    {
        ResolveError::DecryptionFailed {
            reference: reference.to_string(),
            cause: DecryptCause::NotLoggedIn,
        }
    } else {
        ResolveError::StoreUnavailable {
            backend: "keyvault",
            detail: first_line(stderr, "az exited with an error"),
        }
    }
}

fn first_line(stderr: &str, fallback: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
