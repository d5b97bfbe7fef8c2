//! Unit tests for keyhole CLI
//!
//! These tests use mocked ports and run fast without external I/O.

mod doctor_service;
mod inject_service;
mod mocks;
