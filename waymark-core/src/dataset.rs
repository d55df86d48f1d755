//! The entity graph.
//!
//! A [`Dataset`] owns every [`Primitive`] in one arena keyed by
//! [`PrimitiveId`]. Paths and relations refer to other primitives by key, and
//! the dataset resolves those references on demand. Bulk changes go through
//! a [`BulkUpdate`] scope so listeners observe either nothing or the
//! finished batch.

use std::{
    collections::BTreeMap,
    fmt,
    ops::{Deref, DerefMut},
};

use thiserror::Error;

use crate::{DataSource, Primitive, PrimitiveId, PrimitiveKind, UserRegistry};

/// Change notification delivered to a [`DatasetListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetEvent {
    /// Primitives were added, in insertion order.
    PrimitivesAdded {
        /// Keys of the added primitives.
        ids: Vec<PrimitiveId>,
    },
}

/// Observer of dataset changes.
pub trait DatasetListener {
    /// Called once per delivered event.
    fn on_event(&mut self, event: &DatasetEvent);
}

/// Errors raised when mutating a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// A primitive with the same key is already present.
    #[error("{id} is already present in the dataset")]
    DuplicatePrimitive {
        /// The conflicting key.
        id: PrimitiveId,
    },
    /// Identity 0 is never a valid key.
    #[error("{kind} with id 0 cannot be added to a dataset")]
    ZeroId {
        /// Kind of the rejected primitive.
        kind: PrimitiveKind,
    },
}

/// Arena of primitives plus document-level metadata.
///
/// # Examples
/// ```
/// use waymark_core::{Dataset, Primitive, PrimitiveId};
///
/// let mut dataset = Dataset::default();
/// dataset.add_primitive(Primitive::new(PrimitiveId::point(1)))?;
/// let mut path = Primitive::new(PrimitiveId::path(2));
/// path.set_nodes(vec![1]).expect("paths carry nodes");
/// dataset.add_primitive(path)?;
///
/// let nodes: Vec<_> = dataset.path_nodes(2).map(|node| node.id()).collect();
/// assert_eq!(nodes, vec![1]);
/// # Ok::<(), waymark_core::DatasetError>(())
/// ```
#[derive(Default)]
pub struct Dataset {
    version: Option<String>,
    data_sources: Vec<DataSource>,
    users: UserRegistry,
    primitives: BTreeMap<PrimitiveId, Primitive>,
    listeners: Vec<Box<dyn DatasetListener>>,
    update_depth: usize,
    pending: Vec<PrimitiveId>,
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("version", &self.version)
            .field("data_sources", &self.data_sources)
            .field("users", &self.users.len())
            .field("primitives", &self.primitives.len())
            .field("listeners", &self.listeners.len())
            .field("update_depth", &self.update_depth)
            .finish()
    }
}

impl Dataset {
    /// Schema version of the document the data came from.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Record the schema version of the source document.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Areas covered by the source document.
    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    /// Record an area covered by the source document.
    pub fn add_data_source(&mut self, source: DataSource) {
        self.data_sources.push(source);
    }

    /// Authors referenced by primitives.
    #[must_use]
    pub const fn users(&self) -> &UserRegistry {
        &self.users
    }

    /// Mutable access to the author registry.
    pub fn users_mut(&mut self) -> &mut UserRegistry {
        &mut self.users
    }

    /// Register an observer for subsequent changes.
    pub fn add_listener(&mut self, listener: Box<dyn DatasetListener>) {
        self.listeners.push(listener);
    }

    /// Insert a primitive under its key.
    pub fn add_primitive(&mut self, primitive: Primitive) -> Result<(), DatasetError> {
        let key = primitive.key();
        if key.id == 0 {
            return Err(DatasetError::ZeroId { kind: key.kind });
        }
        if self.primitives.contains_key(&key) {
            return Err(DatasetError::DuplicatePrimitive { id: key });
        }
        self.primitives.insert(key, primitive);
        if self.update_depth > 0 {
            self.pending.push(key);
        } else {
            self.notify(&DatasetEvent::PrimitivesAdded { ids: vec![key] });
        }
        Ok(())
    }

    /// Look up a primitive.
    #[must_use]
    pub fn get(&self, key: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&key)
    }

    /// Look up a primitive for modification.
    pub fn get_mut(&mut self, key: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(&key)
    }

    /// Whether a primitive with this key is present.
    #[must_use]
    pub fn contains(&self, key: PrimitiveId) -> bool {
        self.primitives.contains_key(&key)
    }

    /// Number of primitives, incomplete placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the dataset holds no primitives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// All primitives, points first, then paths, then relations.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.values()
    }

    /// Primitives of one kind in ascending id order.
    pub fn primitives_of(&self, kind: PrimitiveKind) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .range(PrimitiveId::new(kind, i64::MIN)..=PrimitiveId::new(kind, i64::MAX))
            .map(|(_, primitive)| primitive)
    }

    /// Number of primitives of one kind.
    #[must_use]
    pub fn count_of(&self, kind: PrimitiveKind) -> usize {
        self.primitives_of(kind).count()
    }

    /// Number of incomplete placeholders.
    #[must_use]
    pub fn incomplete_count(&self) -> usize {
        self.primitives
            .values()
            .filter(|primitive| primitive.is_incomplete())
            .count()
    }

    /// Resolve the points of a path, skipping references with no target.
    pub fn path_nodes(&self, path_id: i64) -> impl Iterator<Item = &Primitive> + '_ {
        self.get(PrimitiveId::path(path_id))
            .map(Primitive::nodes)
            .unwrap_or_default()
            .iter()
            .filter_map(|node_id| self.get(PrimitiveId::point(*node_id)))
    }

    /// Resolve the members of a relation as `(role, primitive)` pairs.
    pub fn relation_members(
        &self,
        relation_id: i64,
    ) -> impl Iterator<Item = (&str, &Primitive)> + '_ {
        self.get(PrimitiveId::relation(relation_id))
            .map(Primitive::members)
            .unwrap_or_default()
            .iter()
            .filter_map(|member| {
                self.get(member.member)
                    .map(|primitive| (member.role.as_str(), primitive))
            })
    }

    /// Open a bulk-update scope.
    ///
    /// Additions made through the returned guard are announced once, when
    /// [`BulkUpdate::commit`] closes the outermost scope. Dropping the guard
    /// without committing discards the announcement; the caller is then
    /// expected to discard the dataset as well.
    pub fn begin_update(&mut self) -> BulkUpdate<'_> {
        self.update_depth += 1;
        BulkUpdate {
            dataset: self,
            committed: false,
        }
    }

    /// Whether a bulk-update scope is open.
    #[must_use]
    pub const fn is_updating(&self) -> bool {
        self.update_depth > 0
    }

    fn end_update(&mut self, commit: bool) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth > 0 {
            return;
        }
        let ids = std::mem::take(&mut self.pending);
        if commit && !ids.is_empty() {
            self.notify(&DatasetEvent::PrimitivesAdded { ids });
        }
    }

    fn notify(&mut self, event: &DatasetEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

/// Guard for a bulk-update scope opened by [`Dataset::begin_update`].
#[must_use = "dropping the scope without committing suppresses change notifications"]
pub struct BulkUpdate<'a> {
    dataset: &'a mut Dataset,
    committed: bool,
}

impl BulkUpdate<'_> {
    /// Close the scope and announce the buffered changes.
    pub fn commit(mut self) {
        self.committed = true;
        self.dataset.end_update(true);
    }
}

impl Deref for BulkUpdate<'_> {
    type Target = Dataset;

    fn deref(&self) -> &Self::Target {
        self.dataset
    }
}

impl DerefMut for BulkUpdate<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dataset
    }
}

impl Drop for BulkUpdate<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.dataset.end_update(false);
        }
    }
}
