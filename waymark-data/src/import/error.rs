//! Fatal import failures.

use std::{fmt, io};

use camino::Utf8PathBuf;
use thiserror::Error;
use waymark_core::{DatasetError, KindMismatchError, PrimitiveId, PrimitiveKind};

use super::{ImportPhase, Location};

/// Boxed error raised by a tokenizer or reader.
pub type StreamError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Conditions that abort an import.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportErrorKind {
    /// The root element carries no `version` attribute.
    #[error("missing mandatory version attribute on the root element")]
    MissingRootVersion,
    /// The root element names a schema version that is not supported.
    #[error("unsupported schema version {found:?}; expected 0.5 or 0.6")]
    UnsupportedVersion {
        /// The rejected version token.
        found: String,
    },
    /// The document contains no recognised root element.
    #[error("document has no osm or osmChange root element")]
    MissingRoot,
    /// A mandatory attribute is absent.
    #[error("missing mandatory attribute {attribute:?} on <{element}>")]
    MissingAttribute {
        /// Element carrying the attribute.
        element: String,
        /// Name of the absent attribute.
        attribute: &'static str,
    },
    /// An attribute value cannot be interpreted.
    #[error("illegal value {value:?} for attribute {attribute:?} on <{element}>")]
    InvalidAttribute {
        /// Element carrying the attribute.
        element: String,
        /// Name of the attribute.
        attribute: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A primitive declares identity 0.
    #[error("illegal id 0 on {kind}")]
    ZeroId {
        /// Kind of the offending primitive.
        kind: PrimitiveKind,
    },
    /// An existing primitive lacks a version under the current schema.
    #[error("missing attribute \"version\" on {id}")]
    MissingVersion {
        /// Offending primitive.
        id: PrimitiveId,
    },
    /// An existing primitive carries a version that is not positive.
    #[error("illegal version {value:?} on {id}")]
    IllegalVersion {
        /// Offending primitive.
        id: PrimitiveId,
        /// The rejected value.
        value: String,
    },
    /// An existing primitive carries an unusable changeset id.
    #[error("illegal changeset {value:?} on {id}")]
    IllegalChangeset {
        /// Offending primitive.
        id: PrimitiveId,
        /// The rejected value.
        value: String,
    },
    /// A timestamp cannot be parsed.
    #[error("illegal timestamp {value:?} on {id}")]
    InvalidTimestamp {
        /// Offending primitive.
        id: PrimitiveId,
        /// The rejected value.
        value: String,
    },
    /// A path refers to point id 0.
    #[error("illegal node reference 0 in way {path}")]
    IllegalNodeReference {
        /// Identity of the path.
        path: i64,
    },
    /// A relation refers to member id 0.
    #[error("illegal member reference 0 in relation {relation}")]
    IllegalMemberReference {
        /// Identity of the relation.
        relation: i64,
    },
    /// A member `type` does not name a primitive kind.
    #[error("unknown member type {value:?} for member {member} in relation {relation}")]
    UnknownMemberKind {
        /// Identity of the relation.
        relation: i64,
        /// Identity of the member.
        member: i64,
        /// The rejected token.
        value: String,
    },
    /// Only one of `lat` and `lon` is present.
    #[error("node {id} carries only one of \"lat\" and \"lon\"")]
    IncompleteCoordinate {
        /// Identity of the point.
        id: i64,
    },
    /// A bounding box lacks one of its corners.
    #[error("bounds element is missing one of minlat, minlon, maxlat, maxlon")]
    IncompleteBounds,
    /// A path refers to a document-local point the document never defines.
    #[error("way {path} refers to node {node}, which is new and absent from the document")]
    MissingNode {
        /// Identity of the path.
        path: i64,
        /// Identity of the missing point.
        node: i64,
    },
    /// A relation refers to a document-local member the document never defines.
    #[error("relation {relation} refers to {member}, which is new and absent from the document")]
    MissingMember {
        /// Identity of the relation.
        relation: i64,
        /// Key of the missing member.
        member: PrimitiveId,
    },
    /// The tokenizer failed.
    #[error("failed to read the document: {source}")]
    Stream {
        /// Underlying transport or decoding error.
        #[source]
        source: StreamError,
    },
    /// The input ended before an element was closed.
    #[error("document ended inside <{within}>")]
    UnexpectedEndOfStream {
        /// Innermost element left open.
        within: String,
    },
    /// An end event arrived with no element open.
    #[error("end of element without a matching start")]
    UnbalancedEnd,
    /// The graph rejected a primitive.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Content was attached to the wrong kind of primitive.
    #[error(transparent)]
    KindMismatch(#[from] KindMismatchError),
    /// The input file could not be opened.
    #[error("failed to open {path}")]
    Open {
        /// Path that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The caller cancelled the import.
    #[error("import cancelled before {phase}")]
    Cancelled {
        /// Phase that was about to start.
        phase: ImportPhase,
    },
}

/// A fatal import failure with the position it was detected at.
///
/// # Examples
/// ```
/// use waymark_data::{ImportError, ImportErrorKind, Location};
///
/// let err = ImportError::new(
///     ImportErrorKind::MissingRootVersion,
///     Some(Location { line: 1, column: 1 }),
/// );
/// assert_eq!(
///     err.to_string(),
///     "missing mandatory version attribute on the root element (at line 1, column 1)"
/// );
/// ```
#[derive(Debug)]
pub struct ImportError {
    kind: ImportErrorKind,
    location: Option<Location>,
}

impl ImportError {
    /// Attach an optional location to a failure.
    #[must_use]
    pub const fn new(kind: ImportErrorKind, location: Option<Location>) -> Self {
        Self { kind, location }
    }

    /// What went wrong.
    #[must_use]
    pub const fn kind(&self) -> &ImportErrorKind {
        &self.kind
    }

    /// Consume the error, returning its kind.
    #[must_use]
    pub fn into_kind(self) -> ImportErrorKind {
        self.kind
    }

    /// Where in the input it went wrong, when known.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} (at {location})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<ImportErrorKind> for ImportError {
    fn from(kind: ImportErrorKind) -> Self {
        Self::new(kind, None)
    }
}
