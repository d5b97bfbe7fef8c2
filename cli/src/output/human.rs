//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::config::AppConfig;
use crate::domain::health::{CheckStatus, DoctorReport, ReferenceCheck};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("keyhole {version}");
    }

    /// Render the current keyhole configuration.
    pub fn render_config(&self, config: &AppConfig, path: &Path) {
        println!();
        self.ctx.header(&format!("Configuration ({})", path.display()));
        println!();
        let unset = "(not set)";
        let timeout = config.timeout_secs.to_string();
        let clear_after = config.clipboard.clear_after_secs.to_string();
        self.ctx.kv("timeout_secs:", &timeout);
        self.ctx.kv(
            "pass.store_dir:",
            config.pass.store_dir.as_deref().unwrap_or(unset),
        );
        self.ctx.kv("pass.program:", &config.pass.program);
        self.ctx.kv(
            "keyvault.default_vault:",
            config.keyvault.default_vault.as_deref().unwrap_or(unset),
        );
        self.ctx.kv("keyvault.program:", &config.keyvault.program);
        self.ctx.kv("clipboard.clear_after_secs:", &clear_after);
        println!();
        println!("  {}", "Aliases:".style(self.ctx.styles.bold));
        if config.aliases.is_empty() {
            println!("    {}", "(none)".style(self.ctx.styles.dim));
        }
        for (name, target) in &config.aliases {
            println!("    {:<26} {target}", format!("@{name}"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["KEYHOLE_CONFIG", "KEYHOLE_LOG", "PASSWORD_STORE_DIR", "NO_COLOR"] {
            println!(
                "    {:<26} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| unset.to_string())
            );
        }
        println!();
    }

    /// Render doctor results, one line per check.
    pub fn render_doctor(&self, report: &DoctorReport) {
        println!();
        println!("  {}", "keyhole doctor".style(self.ctx.styles.header));
        println!();
        for check in &report.checks {
            let marker = match check.status {
                CheckStatus::Ok => "✓".style(self.ctx.styles.success).to_string(),
                CheckStatus::Warn => "!".style(self.ctx.styles.warning).to_string(),
                CheckStatus::Fail => "✗".style(self.ctx.styles.error).to_string(),
            };
            println!("    {marker} {:<22} {}", check.name, check.detail);
        }
        println!();
        println!(
            "  {}",
            doctor_summary(report).style(if report.has_failures() {
                self.ctx.styles.error
            } else {
                self.ctx.styles.success
            })
        );
    }

    /// Render `keyhole check` results. Never shows values.
    pub fn render_checks(&self, checks: &[ReferenceCheck]) {
        for check in checks {
            if check.ok {
                if !self.ctx.quiet {
                    println!("  {} {}", "✓".style(self.ctx.styles.success), check.reference);
                }
                continue;
            }
            println!(
                "  {} {}: {}",
                "✗".style(self.ctx.styles.error),
                check.reference,
                check.message.as_deref().unwrap_or_default()
            );
            if let Some(hint) = &check.hint {
                println!("      {} {hint}", "hint:".style(self.ctx.styles.dim));
            }
        }
    }
}

/// One-line tally such as `5 ok, 1 warning, 0 failed`.
#[must_use]
pub fn doctor_summary(report: &DoctorReport) -> String {
    let warnings = report.count(CheckStatus::Warn);
    format!(
        "{} ok, {warnings} {}, {} failed",
        report.count(CheckStatus::Ok),
        if warnings == 1 { "warning" } else { "warnings" },
        report.count(CheckStatus::Fail),
    )
}
