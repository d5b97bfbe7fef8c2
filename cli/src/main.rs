//! keyhole - resolve secrets at the moment of use

use std::process::ExitCode;

use clap::Parser;
use keyhole_cli::cli::Cli;
use keyhole_cli::domain::error::ResolveError;
use keyhole_cli::output::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let as_json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => report(&e, as_json),
    }
}

/// Logs go to stderr; `KEYHOLE_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("KEYHOLE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report(e: &anyhow::Error, as_json: bool) -> ExitCode {
    let resolve = e.downcast_ref::<ResolveError>();
    let code = resolve.map_or("error", ResolveError::code);
    let hint = resolve.map(ResolveError::remediation);
    let message = format!("{e:#}");

    if as_json {
        match json::format_error(&message, code, hint.as_deref()) {
            Ok(out) => eprintln!("{out}"),
            Err(_) => eprintln!("Error: {message}"),
        }
    } else {
        eprintln!("Error: {message}");
        if let Some(hint) = hint {
            eprintln!("hint: {hint}");
        }
    }
    ExitCode::from(resolve.map_or(1, ResolveError::exit_code))
}
