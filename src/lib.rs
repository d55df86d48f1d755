//! Facade crate for the Waymark OSM importer.
//!
//! This crate re-exports the entity graph types and, behind the `import`
//! feature, the streaming importer.
//!
//! # Examples
//! ```
//! # #[cfg(feature = "import")]
//! # fn main() -> Result<(), waymark::ImportError> {
//! use waymark::{ImportOptions, PrimitiveId, import_osm_xml};
//!
//! let xml = r#"<osm version="0.6"><way id="7" version="1"><nd ref="8"/></way></osm>"#;
//! let report = import_osm_xml(xml.as_bytes(), ImportOptions::default())?;
//! let placeholder = report.dataset.get(PrimitiveId::point(8));
//! assert!(placeholder.is_some_and(|point| point.is_incomplete()));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "import"))]
//! # fn main() {}
//! ```

#![forbid(unsafe_code)]

pub use waymark_core::{
    Bounds, BulkUpdate, DataSource, Dataset, DatasetError, DatasetEvent, DatasetListener,
    Primitive, PrimitiveId, PrimitiveKind, RelationMember, Tags, User, UserKey, UserRegistry,
};

#[cfg(feature = "import")]
pub use waymark_data::{
    CancellableMonitor, CancellationToken, Diagnostic, DiagnosticKind, ImportError,
    ImportErrorKind, ImportOptions, ImportPhase, ImportReport, Location, NullProgressMonitor,
    ProgressMonitor, SchemaVersion, Tokenizer, import_osm, import_osm_file, import_osm_xml,
};
