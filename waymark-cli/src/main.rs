//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Importer diagnostics arrive through `log`; keep stdout for the summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    match waymark_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(waymark_cli::CliError::ArgumentParsing(err)) => {
            if let Err(print_err) = err.print() {
                eprintln!("waymark: failed to print usage: {print_err}");
            }
            ExitCode::from(waymark_cli::exit_code_for(&err))
        }
        Err(err) => {
            eprintln!("waymark: {err}");
            ExitCode::FAILURE
        }
    }
}
