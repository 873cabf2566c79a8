//! # Layer Visibility
//!
//! A layer is a direct Group child of the Root. Toggling a layer flips the
//! `visible` flag of its group, which hides every descendant on the next
//! frame. Models without top-level groups get a single "Whole model" layer
//! bound to the Root itself.

use super::graph::{NodeId, SceneGraph};

pub const WHOLE_MODEL_LABEL: &str = "Whole model";
const UNNAMED_GROUP_LABEL: &str = "Group";

/// A user-facing visibility switch bound to one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerToggle {
    pub node: NodeId,
    pub label: String,
    pub enabled: bool,
}

/// Derives the toggle list for the current scene.
///
/// Toggles appear in child order; `enabled` mirrors each node's flag.
pub fn rebuild(graph: &SceneGraph) -> Vec<LayerToggle> {
    let layers: Vec<LayerToggle> = graph
        .children(graph.root())
        .filter_map(|id| {
            let node = graph.get(id)?;
            node.is_group().then(|| LayerToggle {
                node: id,
                label: if node.name.is_empty() {
                    UNNAMED_GROUP_LABEL.to_string()
                } else {
                    node.name.clone()
                },
                enabled: node.visible,
            })
        })
        .collect();

    if !layers.is_empty() {
        return layers;
    }

    let root = graph.root();
    vec![LayerToggle {
        node: root,
        label: WHOLE_MODEL_LABEL.to_string(),
        enabled: graph.get(root).map_or(true, |node| node.visible),
    }]
}

/// Shows or hides the node bound to `toggle`.
///
/// Returns `false` when the toggle belongs to an earlier scene.
pub fn set_enabled(graph: &mut SceneGraph, toggle: &LayerToggle, enabled: bool) -> bool {
    match graph.get_mut(toggle.node) {
        Some(node) => {
            node.visible = enabled;
            true
        }
        None => {
            log::debug!("ignoring stale layer toggle '{}'", toggle.label);
            false
        }
    }
}
