//! Integration tests for keyhole CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! They are slower and should be run separately from unit tests.

mod doctor_command;
mod fixtures;
mod get_check;
