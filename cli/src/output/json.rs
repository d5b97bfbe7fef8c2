//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the renderer for command results.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::config::AppConfig;
use crate::domain::health::{DoctorReport, ReferenceCheck};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "...",
///   "hint": "..."
/// }
/// ```
/// `hint` is omitted when there is none.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str, hint: Option<&str>) -> Result<String> {
    let mut obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    if let Some(hint) = hint {
        obj["hint"] = serde_json::Value::String(hint.to_string());
    }
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders command results as pretty JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_json(&serde_json::json!({ "version": version }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &AppConfig, path: &Path) -> Result<()> {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_doctor(&self, report: &DoctorReport) -> Result<()> {
        print_json(&serde_json::json!({
            "ok": !report.has_failures(),
            "checks": report.checks,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_checks(&self, checks: &[ReferenceCheck]) -> Result<()> {
        print_json(&serde_json::json!({
            "ok": checks.iter().all(|c| c.ok),
            "results": checks,
        }))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
