//! Points, paths and relations making up the entity graph.
//!
//! A [`Primitive`] is addressed by its [`PrimitiveId`], the pair of kind and
//! signed identity. Positive identities are stable server identities;
//! non-positive identities are local to one document. Edges between
//! primitives are stored as identities and resolved through a
//! [`crate::Dataset`], so a graph may contain cycles without shared
//! ownership.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

use crate::UserKey;

/// Free-form key/value tags. Keys are unique; the last write wins.
pub type Tags = HashMap<String, String>;

/// The three kinds of primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PrimitiveKind {
    /// A single located point (`node`).
    Point,
    /// An ordered sequence of points (`way`).
    Path,
    /// An ordered grouping of members with roles (`relation`).
    Relation,
}

impl PrimitiveKind {
    /// All kinds in resolution order.
    pub const ALL: [Self; 3] = [Self::Point, Self::Path, Self::Relation];

    /// Name of the kind as used by the OSM API and XML format.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::PrimitiveKind;
    ///
    /// assert_eq!(PrimitiveKind::Path.api_name(), "way");
    /// ```
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Point => "node",
            Self::Path => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Raised when a token does not name a primitive kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown primitive kind {token:?}")]
pub struct UnknownKindError {
    /// The rejected token.
    pub token: String,
}

impl FromStr for PrimitiveKind {
    type Err = UnknownKindError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "node" => Ok(Self::Point),
            "way" => Ok(Self::Path),
            "relation" => Ok(Self::Relation),
            other => Err(UnknownKindError {
                token: other.to_owned(),
            }),
        }
    }
}

/// Unique key of a primitive within a graph.
///
/// Ordering sorts by kind first, so points precede paths and relations.
///
/// # Examples
/// ```
/// use waymark_core::{PrimitiveId, PrimitiveKind};
///
/// let id = PrimitiveId::path(-3);
/// assert_eq!(id.kind, PrimitiveKind::Path);
/// assert!(id.is_new());
/// assert_eq!(id.to_string(), "way -3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveId {
    /// Kind of the referenced primitive.
    pub kind: PrimitiveKind,
    /// Signed identity as it appears in the input.
    pub id: i64,
}

impl PrimitiveId {
    /// Build a key from its parts.
    #[must_use]
    pub const fn new(kind: PrimitiveKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Key of a point.
    #[must_use]
    pub const fn point(id: i64) -> Self {
        Self::new(PrimitiveKind::Point, id)
    }

    /// Key of a path.
    #[must_use]
    pub const fn path(id: i64) -> Self {
        Self::new(PrimitiveKind::Path, id)
    }

    /// Key of a relation.
    #[must_use]
    pub const fn relation(id: i64) -> Self {
        Self::new(PrimitiveKind::Relation, id)
    }

    /// Whether the identity is document-local (never assigned by a server).
    #[must_use]
    pub const fn is_new(self) -> bool {
        self.id <= 0
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A role-tagged reference from a relation to one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationMember {
    /// Role of the member; may be empty.
    pub role: String,
    /// Key of the referenced primitive.
    pub member: PrimitiveId,
}

impl RelationMember {
    /// Construct a member reference.
    pub fn new(role: impl Into<String>, member: PrimitiveId) -> Self {
        Self {
            role: role.into(),
            member,
        }
    }
}

/// Kind-specific content of a primitive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    /// Point content. Coordinates use `x = longitude`, `y = latitude`.
    Point {
        /// Location, absent for deleted or incomplete points.
        coord: Option<Coord<f64>>,
    },
    /// Ordered point identities.
    Path {
        /// Identities of the referenced points, in order.
        nodes: Vec<i64>,
    },
    /// Ordered members.
    Relation {
        /// Members in order.
        members: Vec<RelationMember>,
    },
}

impl Payload {
    fn empty(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Point => Self::Point { coord: None },
            PrimitiveKind::Path => Self::Path { nodes: Vec::new() },
            PrimitiveKind::Relation => Self::Relation {
                members: Vec::new(),
            },
        }
    }

    const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Point { .. } => PrimitiveKind::Point,
            Self::Path { .. } => PrimitiveKind::Path,
            Self::Relation { .. } => PrimitiveKind::Relation,
        }
    }
}

/// Raised when kind-specific content is attached to the wrong kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot set {expected} content on {found}")]
pub struct KindMismatchError {
    /// Kind the operation applies to.
    pub expected: PrimitiveKind,
    /// Key of the primitive the operation was attempted on.
    pub found: PrimitiveId,
}

/// A point, path or relation together with its metadata.
///
/// # Examples
/// ```
/// use waymark_core::{Primitive, PrimitiveId};
///
/// let mut path = Primitive::new(PrimitiveId::path(7));
/// path.set_nodes(vec![1, 2, 3])?;
/// assert_eq!(path.nodes(), &[1, 2, 3]);
/// assert!(!path.is_incomplete());
///
/// let placeholder = Primitive::incomplete(PrimitiveId::point(9));
/// assert!(placeholder.is_incomplete());
/// # Ok::<(), waymark_core::KindMismatchError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Primitive {
    id: i64,
    /// Server-side version; 0 for primitives never uploaded.
    pub version: u32,
    /// Whether the primitive is visible (not deleted on the server).
    pub visible: bool,
    /// Whether the primitive is locally marked for deletion.
    pub deleted: bool,
    /// Whether the primitive carries local modifications.
    pub modified: bool,
    /// Changeset the version belongs to; 0 when unknown.
    pub changeset: u64,
    /// Time of the last edit, if known.
    pub timestamp: Option<DateTime<Utc>>,
    /// Author of the last edit, if known.
    pub author: Option<UserKey>,
    /// Key/value tags.
    pub tags: Tags,
    incomplete: bool,
    payload: Payload,
}

impl Primitive {
    /// A complete primitive with default metadata and empty content.
    #[must_use]
    pub fn new(key: PrimitiveId) -> Self {
        Self {
            id: key.id,
            version: 0,
            visible: true,
            deleted: false,
            modified: false,
            changeset: 0,
            timestamp: None,
            author: None,
            tags: Tags::new(),
            incomplete: false,
            payload: Payload::empty(key.kind),
        }
    }

    /// A placeholder for a primitive known only by its identity.
    #[must_use]
    pub fn incomplete(key: PrimitiveId) -> Self {
        Self {
            incomplete: true,
            ..Self::new(key)
        }
    }

    /// Signed identity.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Kind derived from the content.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.payload.kind()
    }

    /// Graph key of this primitive.
    #[must_use]
    pub const fn key(&self) -> PrimitiveId {
        PrimitiveId::new(self.kind(), self.id)
    }

    /// Whether only the identity of this primitive is known.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    /// Kind-specific content.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Location of a point; `None` for other kinds.
    #[must_use]
    pub const fn coord(&self) -> Option<Coord<f64>> {
        match self.payload {
            Payload::Point { coord } => coord,
            Payload::Path { .. } | Payload::Relation { .. } => None,
        }
    }

    /// Point identities of a path; empty for other kinds.
    #[must_use]
    pub fn nodes(&self) -> &[i64] {
        match &self.payload {
            Payload::Path { nodes } => nodes,
            Payload::Point { .. } | Payload::Relation { .. } => &[],
        }
    }

    /// Members of a relation; empty for other kinds.
    #[must_use]
    pub fn members(&self) -> &[RelationMember] {
        match &self.payload {
            Payload::Relation { members } => members,
            Payload::Point { .. } | Payload::Path { .. } => &[],
        }
    }

    /// Set the location of a point.
    pub fn set_coord(&mut self, location: Option<Coord<f64>>) -> Result<(), KindMismatchError> {
        let key = self.key();
        match &mut self.payload {
            Payload::Point { coord } => {
                *coord = location;
                Ok(())
            }
            Payload::Path { .. } | Payload::Relation { .. } => Err(KindMismatchError {
                expected: PrimitiveKind::Point,
                found: key,
            }),
        }
    }

    /// Replace the point identities of a path.
    pub fn set_nodes(&mut self, replacement: Vec<i64>) -> Result<(), KindMismatchError> {
        let key = self.key();
        match &mut self.payload {
            Payload::Path { nodes } => {
                *nodes = replacement;
                Ok(())
            }
            Payload::Point { .. } | Payload::Relation { .. } => Err(KindMismatchError {
                expected: PrimitiveKind::Path,
                found: key,
            }),
        }
    }

    /// Replace the members of a relation.
    pub fn set_members(
        &mut self,
        replacement: Vec<RelationMember>,
    ) -> Result<(), KindMismatchError> {
        let key = self.key();
        match &mut self.payload {
            Payload::Relation { members } => {
                *members = replacement;
                Ok(())
            }
            Payload::Point { .. } | Payload::Path { .. } => Err(KindMismatchError {
                expected: PrimitiveKind::Relation,
                found: key,
            }),
        }
    }

    /// Insert or overwrite a tag.
    pub fn put_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }
}
