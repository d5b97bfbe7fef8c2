//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. All lines go to stderr.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` (suppressed when `ctx.quiet`)
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            eprintln!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            eprintln!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            eprintln!("  {} {message}", "!".style(self.ctx.styles.warning));
        }
    }
}

/// Reporter that drops every event, used in `--json` mode.
pub struct QuietReporter;

impl ProgressReporter for QuietReporter {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Reporter chosen from the output mode.
pub enum Reporter<'a> {
    Terminal(TerminalReporter<'a>),
    Quiet(QuietReporter),
}

impl ProgressReporter for Reporter<'_> {
    fn step(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.step(message),
            Reporter::Quiet(r) => r.step(message),
        }
    }

    fn success(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.success(message),
            Reporter::Quiet(r) => r.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self {
            Reporter::Terminal(r) => r.warn(message),
            Reporter::Quiet(r) => r.warn(message),
        }
    }
}
