//! keyhole CLI library — exposes modules for integration testing and the
//! [`resolve_secret`] entry point.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod infra;
pub mod output;

pub use domain::error::ResolveError;
pub use infra::backends::resolve_secret;
pub use keyhole_common::{SecretRef, SecretValue};
