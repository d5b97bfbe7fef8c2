//! Shared types for keyhole: in-memory secret values and secret references.

pub mod reference;
pub mod secret;

pub use reference::{
    ReferenceError, Scheme, SecretRef, validate_alias_name, validate_env_name,
    validate_secret_name, validate_vault_name,
};
pub use secret::SecretValue;
