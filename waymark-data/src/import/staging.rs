//! Staging area for primitives whose edges are not yet resolved.
//!
//! Primitives are registered as soon as their element has been read so that
//! later elements may refer to them. Path node lists and relation member
//! lists stay here as raw identities until every element has been seen.

use std::collections::HashMap;

use waymark_core::{Primitive, PrimitiveId, PrimitiveKind};

/// A staged relation member: target key plus role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberRef {
    pub target: PrimitiveId,
    pub role: String,
}

/// Primitives and deferred edges collected while streaming.
#[derive(Debug, Default)]
pub(crate) struct DeferredGraph {
    primitives: HashMap<PrimitiveId, Primitive>,
    order: Vec<PrimitiveId>,
    path_nodes: HashMap<i64, Vec<i64>>,
    relation_members: HashMap<i64, Vec<MemberRef>>,
}

impl DeferredGraph {
    /// Stage a point. Returns the primitive it replaced, if any.
    pub fn register_point(&mut self, point: Primitive) -> Option<Primitive> {
        self.register(point)
    }

    /// Stage a path and its node identities.
    pub fn register_path(&mut self, path: Primitive, nodes: Vec<i64>) -> Option<Primitive> {
        self.path_nodes.insert(path.id(), nodes);
        self.register(path)
    }

    /// Stage a relation and its member descriptors.
    pub fn register_relation(
        &mut self,
        relation: Primitive,
        members: Vec<MemberRef>,
    ) -> Option<Primitive> {
        self.relation_members.insert(relation.id(), members);
        self.register(relation)
    }

    fn register(&mut self, primitive: Primitive) -> Option<Primitive> {
        let key = primitive.key();
        let replaced = self.primitives.insert(key, primitive);
        if replaced.is_none() {
            self.order.push(key);
        }
        replaced
    }

    /// Number of staged primitives.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Split the staging area by kind, keeping first-registration order.
    pub fn into_staged(mut self) -> StagedGraph {
        let mut staged = StagedGraph::default();
        for key in self.order {
            let Some(primitive) = self.primitives.remove(&key) else {
                continue;
            };
            match key.kind {
                PrimitiveKind::Point => staged.points.push(primitive),
                PrimitiveKind::Path => {
                    let nodes = self.path_nodes.remove(&key.id).unwrap_or_default();
                    staged.paths.push((primitive, nodes));
                }
                PrimitiveKind::Relation => {
                    let members = self.relation_members.remove(&key.id).unwrap_or_default();
                    staged.relations.push((primitive, members));
                }
            }
        }
        staged
    }
}

/// Staged primitives grouped by kind for the resolver.
#[derive(Debug, Default)]
pub(crate) struct StagedGraph {
    pub points: Vec<Primitive>,
    pub paths: Vec<(Primitive, Vec<i64>)>,
    pub relations: Vec<(Primitive, Vec<MemberRef>)>,
}
