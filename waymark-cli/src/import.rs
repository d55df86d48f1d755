//! Import command implementation for the Waymark CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use waymark_core::{DataSource, PrimitiveKind};
use waymark_data::{ImportOptions, ImportReport, import_osm_file};

use crate::{ARG_IMPORT_PATH, ARG_PRETTY, CliError, ENV_IMPORT_PATH};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import an OSM XML document (optionally bzip2-compressed) \
                 and print a JSON summary of the resolved entity graph. The \
                 input path can come from the command line, configuration \
                 files, or environment variables.",
    about = "Import an OSM XML document"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct ImportArgs {
    /// Path to the `.osm` or `.osm.bz2` document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) path: Option<Utf8PathBuf>,
    /// Indent the JSON summary.
    #[arg(long = ARG_PRETTY)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) pretty: bool,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) path: Utf8PathBuf,
    pub(crate) pretty: bool,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.path, ARG_IMPORT_PATH)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match waymark_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let path = args.path.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_PATH,
            env: ENV_IMPORT_PATH,
        })?;
        Ok(Self {
            path,
            pretty: args.pretty,
        })
    }
}

/// Shape of the graph produced by one import, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ImportSummary {
    /// Schema version declared by the document root.
    pub(crate) version: Option<String>,
    pub(crate) points: usize,
    pub(crate) paths: usize,
    pub(crate) relations: usize,
    /// Placeholders created for server identities absent from the document.
    pub(crate) incomplete: usize,
    pub(crate) data_sources: Vec<DataSource>,
    /// Rendered diagnostics in emission order.
    pub(crate) diagnostics: Vec<String>,
}

impl ImportSummary {
    pub(crate) fn from_report(report: &ImportReport) -> Self {
        let dataset = &report.dataset;
        Self {
            version: dataset.version().map(str::to_owned),
            points: dataset.count_of(PrimitiveKind::Point),
            paths: dataset.count_of(PrimitiveKind::Path),
            relations: dataset.count_of(PrimitiveKind::Relation),
            incomplete: dataset.incomplete_count(),
            data_sources: dataset.data_sources().to_vec(),
            diagnostics: report
                .diagnostics
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

pub(super) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(super) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_import_config(args)?;
    let summary = execute_import(&config)?;
    write_summary(writer, &summary, config.pretty)
}

fn resolve_import_config(args: ImportArgs) -> Result<ImportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(super) fn execute_import(config: &ImportConfig) -> Result<ImportSummary, CliError> {
    let report = import_osm_file(&config.path, ImportOptions::default()).map_err(|source| {
        CliError::Import {
            path: config.path.clone(),
            source: Box::new(source),
        }
    })?;
    Ok(ImportSummary::from_report(&report))
}

fn write_summary(
    writer: &mut dyn Write,
    summary: &ImportSummary,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    }
    .map_err(CliError::SerialiseSummary)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSummary)?;
    writer.write_all(b"\n").map_err(CliError::WriteSummary)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
