//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// Resolve secrets from pass, Azure Key Vault, env and files at the moment of use
#[derive(Parser)]
#[command(
    name = "keyhole",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also disabled by a non-empty NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a secret to stdout
    Get(commands::get::GetArgs),

    /// Verify references resolve, without showing values
    Check(commands::check::CheckArgs),

    /// Run a program with secrets injected
    Exec(commands::exec::ExecArgs),

    /// Copy a secret to the clipboard and restore it after a timeout
    ///
    /// keyhole stays running until the timeout so the clipboard keeps serving
    /// the secret. On X11 and Wayland the clipboard belongs to the running
    /// process: the restored previous text survives keyhole exiting only when
    /// a clipboard manager is running.
    Copy(commands::copy::CopyArgs),

    /// Audit tooling and credential file permissions
    Doctor,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let app = AppContext::new(&OutputFlags {
            no_color: self.no_color,
            quiet: self.quiet,
            json: self.json,
        });
        match self.command {
            Command::Get(args) => commands::get::run(&app, &args).await,
            Command::Check(args) => commands::check::run(&app, &args).await,
            Command::Exec(args) => commands::exec::run(&app, args).await,
            Command::Copy(args) => commands::copy::run(&app, &args).await,
            Command::Doctor => commands::doctor::run(&app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
