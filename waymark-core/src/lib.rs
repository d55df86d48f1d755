//! Core entity graph types for the Waymark importer.
//!
//! Primitives (points, paths and relations) live in a [`Dataset`] arena keyed
//! by [`PrimitiveId`]. Edges are stored as keys, so graphs containing cycles
//! need no shared ownership. Constructors and mutators return `Result` to
//! surface invalid input early.

pub mod bounds;
pub mod dataset;
pub mod primitive;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bounds::{Bounds, DataSource};
pub use dataset::{BulkUpdate, Dataset, DatasetError, DatasetEvent, DatasetListener};
pub use primitive::{
    KindMismatchError, Payload, Primitive, PrimitiveId, PrimitiveKind, RelationMember, Tags,
    UnknownKindError,
};
pub use user::{User, UserKey, UserRegistry};
