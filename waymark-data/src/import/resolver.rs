//! Turns staged primitives into a wired graph.
//!
//! Resolution runs in three passes: points, then paths, then relations.
//! Relations are inserted empty before any member list is wired, so
//! relations may refer to each other in any order, cycles included.

use log::debug;
use waymark_core::{Dataset, Primitive, PrimitiveId, RelationMember};

use super::{
    DiagnosticKind, ImportErrorKind,
    diagnostic::Diagnostics,
    staging::{MemberRef, StagedGraph},
};

/// Outcome of looking up one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// The target exists and is usable.
    Present,
    /// The target exists but is marked deleted.
    Deleted,
    /// The target was absent and a placeholder now stands in for it.
    Placeholder,
}

pub(crate) struct Resolver<'a> {
    dataset: &'a mut Dataset,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(dataset: &'a mut Dataset, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            dataset,
            diagnostics,
        }
    }

    /// Run all passes. Any error leaves the dataset half-built; callers
    /// must discard it.
    pub fn resolve(mut self, staged: StagedGraph) -> Result<(), ImportErrorKind> {
        let StagedGraph {
            points,
            paths,
            relations,
        } = staged;
        self.add_points(points)?;
        self.wire_paths(paths)?;
        self.wire_relations(relations)
    }

    fn add_points(&mut self, points: Vec<Primitive>) -> Result<(), ImportErrorKind> {
        for point in points {
            self.dataset.add_primitive(point)?;
        }
        Ok(())
    }

    fn wire_paths(&mut self, paths: Vec<(Primitive, Vec<i64>)>) -> Result<(), ImportErrorKind> {
        for (mut path, node_ids) in paths {
            let mut nodes = Vec::with_capacity(node_ids.len());
            let mut placeholders = 0_usize;
            for node in node_ids {
                let target = self.target(PrimitiveId::point(node), || {
                    ImportErrorKind::MissingNode {
                        path: path.id(),
                        node,
                    }
                })?;
                match target {
                    Target::Deleted => self.diagnostics.emit(
                        DiagnosticKind::DeletedNodeDropped,
                        format!(
                            "way {} refers to deleted node {node}; dropping the reference",
                            path.id()
                        ),
                        None,
                    ),
                    Target::Placeholder => {
                        placeholders += 1;
                        nodes.push(node);
                    }
                    Target::Present => nodes.push(node),
                }
            }
            if placeholders > 0 {
                debug!(
                    "way {} refers to {placeholders} node(s) absent from the document",
                    path.id()
                );
            }
            path.set_nodes(nodes)?;
            self.dataset.add_primitive(path)?;
        }
        Ok(())
    }

    fn wire_relations(
        &mut self,
        relations: Vec<(Primitive, Vec<MemberRef>)>,
    ) -> Result<(), ImportErrorKind> {
        let mut pending = Vec::with_capacity(relations.len());
        for (relation, members) in relations {
            pending.push((relation.key(), members));
            self.dataset.add_primitive(relation)?;
        }
        for (key, refs) in pending {
            let mut members = Vec::with_capacity(refs.len());
            for MemberRef { target, role } in refs {
                let found = self.target(target, || ImportErrorKind::MissingMember {
                    relation: key.id,
                    member: target,
                })?;
                if found == Target::Deleted {
                    self.diagnostics.emit(
                        DiagnosticKind::DeletedMemberDropped,
                        format!(
                            "relation {} refers to deleted {target}; dropping the member",
                            key.id
                        ),
                        None,
                    );
                } else {
                    members.push(RelationMember::new(role, target));
                }
            }
            if let Some(relation) = self.dataset.get_mut(key) {
                relation.set_members(members)?;
            }
        }
        Ok(())
    }

    /// Look up a reference, creating a placeholder for absent server ids.
    fn target(
        &mut self,
        key: PrimitiveId,
        missing: impl FnOnce() -> ImportErrorKind,
    ) -> Result<Target, ImportErrorKind> {
        if let Some(primitive) = self.dataset.get(key) {
            return Ok(if primitive.deleted {
                Target::Deleted
            } else {
                Target::Present
            });
        }
        if key.is_new() {
            return Err(missing());
        }
        self.dataset.add_primitive(Primitive::incomplete(key))?;
        Ok(Target::Placeholder)
    }
}
