//! Command implementations

pub mod check;
pub mod config;
pub mod copy;
pub mod doctor;
pub mod exec;
pub mod get;
pub mod version;
