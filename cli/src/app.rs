//! Application context — unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change here;
//! command signatures stay the same.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ResolveError;
use crate::infra::backends::{ProductionResolver, build_resolver};
use crate::infra::config::YamlConfigStore;
use crate::output::{
    HumanRenderer, JsonRenderer, OutputContext, QuietReporter, Renderer, Reporter, TerminalReporter,
};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags passed from the top-level CLI.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration persistence.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config_store: YamlConfigStore::default(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for services. Silent in JSON mode so stderr carries
    /// only the error object.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        match self.mode {
            OutputMode::Human => Reporter::Terminal(TerminalReporter::new(&self.output)),
            OutputMode::Json => Reporter::Quiet(QuietReporter),
        }
    }

    /// Load configuration for secret resolution.
    ///
    /// # Errors
    ///
    /// An unreadable or malformed file is reported as `StoreUnavailable` for
    /// the `config` backend.
    pub fn config(&self) -> Result<AppConfig> {
        self.config_store.load().map_err(|e| {
            anyhow::Error::from(ResolveError::StoreUnavailable {
                backend: "config",
                detail: format!("{e:#}"),
            })
        })
    }

    /// Resolver wired to the real backends and the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn resolver(&self) -> Result<ProductionResolver> {
        Ok(build_resolver(&self.config()?))
    }
}
