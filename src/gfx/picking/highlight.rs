//! Selection highlight
//!
//! At most one mesh is highlighted at a time. Highlighting overwrites the
//! mesh's emissive color with the tint and remembers the original, which is
//! written back before any other mesh is tinted. A mesh whose material has
//! no emissive channel can be selected but is never recorded as highlighted.

use crate::gfx::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Highlighted {
    node: NodeId,
    /// Emissive color before tinting
    saved: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct HighlightState {
    tint: [f32; 3],
    current: Option<Highlighted>,
}

impl HighlightState {
    pub fn new(tint: [f32; 3]) -> Self {
        Self {
            tint,
            current: None,
        }
    }

    /// The currently highlighted mesh
    pub fn current(&self) -> Option<NodeId> {
        self.current.map(|highlighted| highlighted.node)
    }

    /// Moves the highlight to `picked`, or removes it for `None`.
    ///
    /// Re-applying the current mesh does nothing. Non-mesh nodes and ids from
    /// another scene revision end up unhighlighted.
    pub fn apply(&mut self, graph: &mut SceneGraph, picked: Option<NodeId>) {
        if picked == self.current() {
            return;
        }
        self.clear(graph);

        let Some(node) = picked else {
            return;
        };
        let Some(mesh) = graph.get_mut(node).and_then(|n| n.mesh_mut()) else {
            log::debug!("node {} is not a mesh, nothing to highlight", node.index());
            return;
        };

        let Some(saved) = mesh.material.emissive else {
            log::debug!("mesh {} has no emissive channel, left untinted", node.index());
            return;
        };
        mesh.material.emissive = Some(self.tint);
        self.current = Some(Highlighted { node, saved });
    }

    /// Restores the highlighted mesh's original emissive color
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        let Some(highlighted) = self.current.take() else {
            return;
        };
        if let Some(mesh) = graph.get_mut(highlighted.node).and_then(|n| n.mesh_mut()) {
            mesh.material.emissive = Some(highlighted.saved);
        }
    }

    /// Drops the highlight without touching the graph, for when the
    /// highlighted mesh has been unloaded
    pub fn forget(&mut self) {
        self.current = None;
    }
}
