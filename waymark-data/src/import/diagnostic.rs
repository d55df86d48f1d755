//! Recoverable problems reported while importing.

use std::fmt;

use log::warn;

use super::Location;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// An unrecognised element was skipped with its subtree.
    UnknownElement,
    /// A missing or illegal version was replaced.
    VersionNormalised,
    /// An unusable changeset on a new primitive was reset to 0.
    ChangesetReset,
    /// A deleted path listed nodes; they were discarded.
    DeletedPathWithNodes,
    /// A deleted relation listed members; they were discarded.
    DeletedRelationWithMembers,
    /// A bounding box outside the world was clamped.
    BoundsNormalised,
    /// A path referred to a deleted point, which was dropped.
    DeletedNodeDropped,
    /// A relation referred to a deleted member, which was dropped.
    DeletedMemberDropped,
    /// A second element reused a key; the later one replaced the earlier.
    DuplicatePrimitive,
}

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category of the problem.
    pub kind: DiagnosticKind,
    /// Human-readable explanation.
    pub message: String,
    /// Position in the input, when the problem was found while streaming.
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects diagnostics and mirrors each one to the log.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn emit(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
            location,
        };
        warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
