//! Streaming import of OSM XML documents into a [`Dataset`].
//!
//! The importer reads the document once, staging every primitive by key and
//! keeping path and relation edges as raw identities. Once the input is
//! exhausted, the resolver wires the edges in three passes and materialises
//! incomplete placeholders for server identities the document does not
//! contain. The whole run happens inside one bulk-update scope, so dataset
//! listeners observe either nothing or the finished graph.
//!
//! Recoverable problems are logged with [`log::warn!`] and returned as
//! [`Diagnostic`]s; anything else aborts the import with an [`ImportError`].

use std::{
    fmt,
    io::{BufRead, BufReader},
};

use bzip2::read::MultiBzDecoder;
use camino::Utf8Path;
use log::debug;
use waymark_core::{Dataset, DatasetListener};

mod diagnostic;
mod error;
mod fields;
mod parser;
mod progress;
mod resolver;
mod schema;
mod staging;
mod tokenizer;
mod xml;

#[doc(hidden)]
pub mod test_support;


pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{ImportError, ImportErrorKind, StreamError};
pub use progress::{
    CancellableMonitor, CancellationToken, ImportPhase, NullProgressMonitor, ProgressMonitor,
};
pub use schema::SchemaVersion;
pub use tokenizer::{Location, StartElement, Tokenizer, XmlEvent};
pub use xml::{QuickXmlTokenizer, TokenizeError};

use diagnostic::Diagnostics;
use parser::ElementParser;
use resolver::Resolver;

/// Number of progress steps an import reports.
const IMPORT_STEPS: usize = 2;

/// Collaborators attached to one import.
///
/// # Examples
/// ```
/// use waymark_data::{CancellableMonitor, CancellationToken, ImportOptions};
///
/// let token = CancellationToken::default();
/// let options = ImportOptions::default().with_monitor(CancellableMonitor::new(token.clone()));
/// # let _ = options;
/// ```
#[derive(Default)]
pub struct ImportOptions {
    monitor: Option<Box<dyn ProgressMonitor>>,
    listeners: Vec<Box<dyn DatasetListener>>,
}

impl ImportOptions {
    /// Report progress to `monitor` and honour its cancellation requests.
    #[must_use]
    pub fn with_monitor(mut self, monitor: impl ProgressMonitor + 'static) -> Self {
        self.monitor = Some(Box::new(monitor));
        self
    }

    /// Register a listener on the dataset before anything is added.
    #[must_use]
    pub fn with_listener(mut self, listener: impl DatasetListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("monitor", &self.monitor.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Result of a successful import.
#[derive(Debug)]
pub struct ImportReport {
    /// The resolved graph.
    pub dataset: Dataset,
    /// Recoverable problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.kind == kind)
    }
}

/// Import a document from any [`Tokenizer`].
///
/// The tokenizer is consumed and dropped before this function returns,
/// whatever the outcome. The monitor's `finish` is always called.
///
/// # Errors
/// Returns [`ImportError`] for every fatal condition; no partial dataset is
/// ever returned.
pub fn import_osm<T: Tokenizer>(
    mut tokenizer: T,
    options: ImportOptions,
) -> Result<ImportReport, ImportError> {
    let ImportOptions { monitor, listeners } = options;
    let mut monitor = monitor.unwrap_or_else(|| Box::new(NullProgressMonitor));
    monitor.begin(IMPORT_STEPS);
    let outcome = run(&mut tokenizer, monitor.as_mut(), listeners);
    monitor.finish();
    outcome
}

/// Import an XML document from a buffered reader.
///
/// # Examples
/// ```
/// use waymark_data::{ImportOptions, import_osm_xml};
/// use waymark_core::PrimitiveId;
///
/// let xml = r#"<osm version="0.6">
///   <node id="1" version="1" lat="51.5" lon="-0.1"/>
///   <way id="2" version="1"><nd ref="1"/><nd ref="3"/></way>
/// </osm>"#;
/// let report = import_osm_xml(xml.as_bytes(), ImportOptions::default())?;
/// let missing = report.dataset.get(PrimitiveId::point(3));
/// assert!(missing.is_some_and(|point| point.is_incomplete()));
/// # Ok::<(), waymark_data::ImportError>(())
/// ```
///
/// # Errors
/// See [`import_osm`].
pub fn import_osm_xml<R: BufRead>(
    reader: R,
    options: ImportOptions,
) -> Result<ImportReport, ImportError> {
    import_osm(QuickXmlTokenizer::new(reader), options)
}

/// Import an XML file, decompressing it first when it ends in `.bz2`.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use waymark_data::{ImportOptions, import_osm_file};
///
/// let report = import_osm_file(Utf8Path::new("berlin.osm.bz2"), ImportOptions::default())?;
/// println!("Imported {} primitives", report.dataset.len());
/// # Ok::<(), waymark_data::ImportError>(())
/// ```
///
/// # Errors
/// Returns [`ImportErrorKind::Open`] when the file cannot be opened, and
/// otherwise behaves like [`import_osm`].
pub fn import_osm_file(path: &Utf8Path, options: ImportOptions) -> Result<ImportReport, ImportError> {
    let file = waymark_fs::open_utf8_file(path).map_err(|source| ImportErrorKind::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if waymark_fs::has_extension(path, "bz2") {
        debug!("decompressing {path} as bzip2");
        import_osm_xml(BufReader::new(MultiBzDecoder::new(file)), options)
    } else {
        import_osm_xml(BufReader::new(file), options)
    }
}

fn run<T: Tokenizer>(
    tokenizer: &mut T,
    monitor: &mut dyn ProgressMonitor,
    listeners: Vec<Box<dyn DatasetListener>>,
) -> Result<ImportReport, ImportError> {
    let mut dataset = Dataset::default();
    for listener in listeners {
        dataset.add_listener(listener);
    }
    let mut diagnostics = Diagnostics::default();
    {
        let mut scope = dataset.begin_update();

        checkpoint(monitor, ImportPhase::Parsing)?;
        let staged = ElementParser::new(tokenizer, &mut scope, &mut diagnostics).parse()?;
        monitor.worked(1);

        checkpoint(monitor, ImportPhase::Resolving)?;
        debug!("resolving {} staged primitives", staged.len());
        Resolver::new(&mut scope, &mut diagnostics).resolve(staged.into_staged())?;
        monitor.worked(1);

        scope.commit();
    }
    debug!(
        "imported {} primitives ({} incomplete) with {} diagnostics",
        dataset.len(),
        dataset.incomplete_count(),
        diagnostics.len()
    );
    Ok(ImportReport {
        dataset,
        diagnostics: diagnostics.into_vec(),
    })
}

fn checkpoint(monitor: &mut dyn ProgressMonitor, phase: ImportPhase) -> Result<(), ImportError> {
    if monitor.is_cancelled() {
        debug!("import cancelled before {phase}");
        return Err(ImportErrorKind::Cancelled { phase }.into());
    }
    debug!("import entering {phase}");
    monitor.phase(phase);
    Ok(())
}
