//! Doctor check domain types.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use serde::Serialize;

use crate::domain::error::{PermissionProblem, ResolveError};
use crate::domain::permissions::Policy;

/// Outcome of one doctor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

/// A single named check with a human-readable detail line.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

/// All checks, in the order they ran.
#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn push(&mut self, name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) {
        self.checks.push(DoctorCheck {
            name: name.into(),
            status,
            detail: detail.into(),
        });
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    #[must_use]
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

/// Outcome of resolving one reference in `keyhole check`. Never carries the value.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceCheck {
    pub reference: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ReferenceCheck {
    #[must_use]
    pub fn passed(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            ok: true,
            code: None,
            message: None,
            hint: None,
        }
    }

    #[must_use]
    pub fn failed(reference: &str, err: &ResolveError) -> Self {
        Self {
            reference: reference.to_string(),
            ok: false,
            code: Some(err.code()),
            message: Some(err.to_string()),
            hint: Some(err.remediation()),
        }
    }
}

/// Turn a mode lookup into a check outcome.
///
/// `mode` is `None` when the path does not exist; `missing` decides how that
/// is reported.
#[must_use]
pub fn evaluate_mode(
    location: &str,
    mode: Option<u32>,
    policy: Policy,
    missing: CheckStatus,
) -> (CheckStatus, String) {
    let Some(mode) = mode else {
        return (missing, format!("{location} does not exist"));
    };
    match policy.check(mode) {
        Ok(()) => (CheckStatus::Ok, format!("{location} ({:04o})", mode & 0o777)),
        Err(problem @ PermissionProblem::TooPermissive { max, .. }) => (
            CheckStatus::Fail,
            format!("{location}: {problem}; run chmod {max:o} {location}"),
        ),
        Err(problem) => (CheckStatus::Fail, format!("{location}: {problem}")),
    }
}
