//! Domain layer — pure types, policies, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod classify;
pub mod config;
pub mod error;
pub mod health;
pub mod pass_entry;
pub mod permissions;

pub use config::{AppConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, DecryptCause, InjectError, PermissionProblem, ResolveError};
pub use health::{CheckStatus, DoctorCheck, DoctorReport, ReferenceCheck};
pub use permissions::Policy;
