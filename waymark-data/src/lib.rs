//! Import of OSM XML documents into the Waymark entity graph.
//!
//! Responsibilities:
//! - Tokenize XML input and read primitive elements in a single pass.
//! - Apply the schema-version rules for identities, versions and changesets.
//! - Resolve forward and cyclic references into a consistent [`waymark_core::Dataset`].
//!
//! Boundaries:
//! - Geometry is not validated; only identity and referential integrity.
//! - Graph types live in `waymark-core`; this crate only builds them.
//!
//! Invariants:
//! - A failed import never exposes a partially built dataset.
//! - No global mutable state.

pub mod import;

pub use import::{
    CancellableMonitor, CancellationToken, Diagnostic, DiagnosticKind, ImportError,
    ImportErrorKind, ImportOptions, ImportPhase, ImportReport, Location, NullProgressMonitor,
    ProgressMonitor, QuickXmlTokenizer, SchemaVersion, StartElement, StreamError, TokenizeError,
    Tokenizer, XmlEvent, import_osm, import_osm_file, import_osm_xml, test_support,
};
