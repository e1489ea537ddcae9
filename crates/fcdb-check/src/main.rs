//! fcdbchk entry point.

use clap::Parser;
use fcdb_check::{run, Cli, CliError, CliResult, Context};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match Context::load(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("fcdbchk: {}", e);
            return ExitCode::from(e.exit_status().code());
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| ctx.config.logging.level.clone());
    if let Err(e) = init_logging(&level, cli.json_log || ctx.config.logging.json) {
        eprintln!("fcdbchk: {}", e);
        return ExitCode::from(e.exit_status().code());
    }

    info!(command = ?cli.command, "fcdbchk: starting");

    let stdout = io::stdout();
    match run(&ctx, &cli, &mut stdout.lock()) {
        Ok(status) => {
            info!(code = status.code(), "fcdbchk: done");
            ExitCode::from(status.code())
        }
        Err(e) => {
            error!(error = %e, "fcdbchk: command failed");
            ExitCode::from(e.exit_status().code())
        }
    }
}

/// Initialize structured logging. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str, json: bool) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())
    };
    result.map_err(|e| CliError::Logging(format!("Failed to set logger: {}", e)))
}
