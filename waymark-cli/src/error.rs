//! Error types emitted by the Waymark CLI.
//!
//! Import failures are boxed so that `Result<_, CliError>` stays small.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use waymark_data::ImportError;

/// Errors emitted by the Waymark CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set <{field}> or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The importer rejected the document.
    #[error("failed to import {path:?}: {source}")]
    Import {
        path: Utf8PathBuf,
        #[source]
        source: Box<ImportError>,
    },
    /// Serialising the import summary failed.
    #[error("failed to serialise import summary: {0}")]
    SerialiseSummary(#[source] serde_json::Error),
    /// Writing the import summary failed.
    #[error("failed to write import summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
