//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, secret
//! store backends, filesystem access, scoped temp files, configuration and
//! the clipboard.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod backends;
pub mod clipboard;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod scoped_file;
