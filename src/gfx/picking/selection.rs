//! User-facing description of the picked mesh

use crate::gfx::scene::{NodeId, SceneGraph};

const PATH_LENGTH: usize = 4;

/// Identity and ancestry of the selected mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    /// Mesh name, `"Mesh"` when unnamed
    pub name: String,
    /// Ancestor names nearest first, unnamed ones shown by kind
    pub ancestors: Vec<String>,
}

impl Selection {
    /// Describes `node`, reporting at most `depth` ancestors.
    ///
    /// Returns `None` when the node is not in the graph's current revision.
    pub fn from_graph(graph: &SceneGraph, node: NodeId, depth: usize) -> Option<Self> {
        let name = graph.display_name(node)?.to_string();
        let ancestors = graph
            .ancestors(node)
            .take(depth)
            .filter_map(|ancestor| graph.display_name(ancestor).map(str::to_string))
            .collect();

        Some(Self {
            node,
            name,
            ancestors,
        })
    }

    /// The mesh followed by its ancestors, four entries at most
    pub fn path(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.ancestors.iter().map(String::as_str))
            .take(PATH_LENGTH)
            .collect()
    }

    /// One-line summary such as `Selected Head path Head > Skin > Root`
    pub fn describe(&self) -> String {
        format!("Selected {} path {}", self.name, self.path().join(" > "))
    }
}
