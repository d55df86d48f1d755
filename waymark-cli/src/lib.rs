//! Command-line interface for the Waymark OSM importer.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod import;

pub use error::CliError;

use import::{ImportArgs, run_import};

pub(crate) const ARG_IMPORT_PATH: &str = "path";
pub(crate) const ARG_PRETTY: &str = "pretty";
pub(crate) const ENV_IMPORT_PATH: &str = "WAYMARK_CMDS_IMPORT_PATH";

/// Run the Waymark CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Import(args) => run_import(args),
    }
}

/// Process exit status for an argument parsing failure.
///
/// Help and version requests map to success; anything clap reports outside
/// the `u8` range falls back to the usage error status.
#[must_use]
pub fn exit_code_for(err: &clap::Error) -> u8 {
    u8::try_from(err.exit_code()).unwrap_or(USAGE_EXIT_CODE)
}

const USAGE_EXIT_CODE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Import OpenStreetMap XML documents into an entity graph",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import an OSM XML document and print a summary of the resulting graph.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;
