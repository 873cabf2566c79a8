//! # Scene Graph
//!
//! Arena-backed node hierarchy with a single Root.
//!
//! Nodes live in a flat `Vec` in depth-first pre-order and point at their
//! children by arena index; a parallel parent table answers ancestry queries
//! without back-pointers. World transforms and subtree bounds are computed once
//! when a subtree is loaded, because nothing can move a node afterwards.
//!
//! Every structural change (load or clear) bumps the graph's revision. A
//! [`NodeId`] remembers the revision it was issued for, so ids held across a
//! reload resolve to `None` instead of to an unrelated node.

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};

use super::bounds::Aabb;
use super::material::Material;
use super::mesh::MeshGeometry;
use crate::loader::{DecodedNode, DecodedScene};

const ROOT_INDEX: usize = 0;

/// Handle to a node in a specific revision of a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    revision: u64,
}

impl NodeId {
    /// Position of the node in pre-order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Geometry and surface of a mesh node
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub geometry: Arc<MeshGeometry>,
    pub material: Material,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
}

/// A node of the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Node name, empty when the source document did not name it
    pub name: String,
    /// Visibility flag; a hidden node hides its whole subtree
    pub visible: bool,
    transform: Matrix4<f32>,
    kind: NodeKind,
    children: Vec<usize>,
}

impl SceneNode {
    fn new(name: String, transform: Matrix4<f32>, kind: NodeKind) -> Self {
        Self {
            name,
            visible: true,
            transform,
            kind,
            children: Vec::new(),
        }
    }

    /// Local transform relative to the parent
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Counts describing the loaded model, Root excluded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_count: usize,
    pub group_count: usize,
    pub triangle_count: usize,
    pub vertex_count: usize,
}

/// The viewer's node hierarchy
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    parents: Vec<Option<usize>>,
    world: Vec<Matrix4<f32>>,
    bounds: Vec<Aabb>,
    revision: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only an empty Root
    pub fn new() -> Self {
        Self::with_revision(0)
    }

    fn with_revision(revision: u64) -> Self {
        Self {
            nodes: vec![SceneNode::new(
                String::new(),
                Matrix4::identity(),
                NodeKind::Group,
            )],
            parents: vec![None],
            world: vec![Matrix4::identity()],
            bounds: vec![Aabb::empty()],
            revision,
        }
    }

    pub fn root(&self) -> NodeId {
        self.id(ROOT_INDEX)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of nodes including the Root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the Root has no children
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT_INDEX].children.is_empty()
    }

    fn id(&self, index: usize) -> NodeId {
        NodeId {
            index,
            revision: self.revision,
        }
    }

    fn resolve(&self, id: NodeId) -> Option<usize> {
        (id.revision == self.revision && id.index < self.nodes.len()).then_some(id.index)
    }

    /// Looks up a node; ids from an earlier revision resolve to `None`
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.resolve(id).map(|index| &self.nodes[index])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.resolve(id).map(move |index| &mut self.nodes[index])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.resolve(id).is_some()
    }

    /// Replaces all children of the Root with a decoded hierarchy.
    ///
    /// The new arena is assembled completely before it replaces the current
    /// one, so readers only ever see the old or the new scene. Root
    /// visibility is reset.
    pub fn load_subtree(&mut self, decoded: DecodedScene) {
        let mut fresh = Self::with_revision(self.revision + 1);
        for node in decoded.roots {
            fresh.insert(ROOT_INDEX, node);
        }
        fresh.accumulate_bounds();
        log::debug!(
            "scene graph revision {} holds {} nodes",
            fresh.revision,
            fresh.nodes.len()
        );
        *self = fresh;
    }

    /// Removes every node except the Root
    pub fn clear(&mut self) {
        *self = Self::with_revision(self.revision + 1);
    }

    fn insert(&mut self, parent: usize, decoded: DecodedNode) {
        let index = self.nodes.len();
        let world = self.world[parent] * decoded.transform;
        let local_bounds = match &decoded.kind {
            NodeKind::Mesh(mesh) => mesh.geometry.bounds().transform(&world),
            NodeKind::Group => Aabb::empty(),
        };

        self.nodes
            .push(SceneNode::new(decoded.name, decoded.transform, decoded.kind));
        self.parents.push(Some(parent));
        self.world.push(world);
        self.bounds.push(local_bounds);
        self.nodes[parent].children.push(index);

        for child in decoded.children {
            self.insert(index, child);
        }
    }

    // Children always sit after their parent, so a reverse sweep sees every
    // subtree complete before its parent.
    fn accumulate_bounds(&mut self) {
        for index in (1..self.nodes.len()).rev() {
            if let Some(parent) = self.parents[index] {
                self.bounds[parent] = self.bounds[parent].union(&self.bounds[index]);
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let index = self.resolve(id)?;
        self.parents[index].map(|parent| self.id(parent))
    }

    /// Parents of `id`, nearest first, ending with the Root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.resolve(id).and_then(|index| self.parents[index]);
        std::iter::from_fn(move || {
            let index = current?;
            current = self.parents[index];
            Some(self.id(index))
        })
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let children = match self.resolve(id) {
            Some(index) => self.nodes[index].children.as_slice(),
            None => &[],
        };
        children.iter().map(|&child| self.id(child))
    }

    /// Depth-first pre-order walk of `from` and its descendants
    pub fn traverse(&self, from: NodeId) -> Traverse<'_> {
        Traverse::new(self, from, false)
    }

    /// Pre-order walk that skips hidden nodes together with their subtrees
    pub fn traverse_visible(&self, from: NodeId) -> Traverse<'_> {
        Traverse::new(self, from, true)
    }

    /// True when the node and all of its ancestors are visible
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        node.visible
            && self
                .ancestors(id)
                .all(|ancestor| self.nodes[ancestor.index].visible)
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Matrix4<f32>> {
        self.resolve(id).map(|index| self.world[index])
    }

    /// World-space bounds of the node's meshes and all descendant meshes,
    /// hidden ones included
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.resolve(id).map(|index| self.bounds[index])
    }

    /// Every mesh node in pre-order
    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.mesh().map(|mesh| (self.id(index), mesh)))
    }

    /// Name for display: the node's own name, or its kind when unnamed
    pub fn display_name(&self, id: NodeId) -> Option<&str> {
        let index = self.resolve(id)?;
        let node = &self.nodes[index];
        Some(if !node.name.is_empty() {
            node.name.as_str()
        } else if index == ROOT_INDEX {
            "Root"
        } else if node.is_group() {
            "Group"
        } else {
            "Mesh"
        })
    }

    pub fn statistics(&self) -> SceneStatistics {
        self.nodes
            .iter()
            .skip(1)
            .fold(SceneStatistics::default(), |mut stats, node| {
                stats.node_count += 1;
                match &node.kind {
                    NodeKind::Group => stats.group_count += 1,
                    NodeKind::Mesh(mesh) => {
                        stats.mesh_count += 1;
                        stats.triangle_count += mesh.geometry.triangle_count();
                        stats.vertex_count += mesh.geometry.vertex_count();
                    }
                }
                stats
            })
    }
}

/// Lazy pre-order iterator over a subtree, see [`SceneGraph::traverse`]
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<usize>,
    visible_only: bool,
}

impl<'a> Traverse<'a> {
    fn new(graph: &'a SceneGraph, from: NodeId, visible_only: bool) -> Self {
        Self {
            graph,
            stack: graph.resolve(from).into_iter().collect(),
            visible_only,
        }
    }
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let index = self.stack.pop()?;
            let node = &self.graph.nodes[index];
            if self.visible_only && !node.visible {
                continue;
            }
            self.stack.extend(node.children.iter().rev());
            return Some(self.graph.id(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use cgmath::Vector3;

    fn cube_node(name: &str, offset: [f32; 3]) -> DecodedNode {
        DecodedNode::mesh(name, Arc::new(generate_cube().into_mesh()), Material::default())
            .with_transform(Matrix4::from_translation(Vector3::from(offset)))
    }

    fn sample() -> DecodedScene {
        DecodedScene::new()
            .with_root(
                DecodedNode::group("Skin")
                    .with_child(cube_node("Head", [0.0, 2.0, 0.0]))
                    .with_child(cube_node("Torso", [0.0, 1.0, 0.0])),
            )
            .with_root(
                DecodedNode::group("Skeleton")
                    .with_transform(Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0)))
                    .with_child(cube_node("", [0.0, 0.0, 0.0])),
            )
    }

    fn find(graph: &SceneGraph, name: &str) -> NodeId {
        graph
            .traverse(graph.root())
            .find(|id| graph.get(*id).map(|n| n.name.as_str()) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_traverse_is_preorder() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());

        let names: Vec<_> = graph
            .traverse(graph.root())
            .map(|id| graph.display_name(id).unwrap().to_string())
            .collect();
        assert_eq!(names, ["Root", "Skin", "Head", "Torso", "Skeleton", "Mesh"]);

        let indices: Vec<_> = graph.traverse(graph.root()).map(|id| id.index()).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_traverse_visible_skips_hidden_subtree() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());
        let skin = find(&graph, "Skin");
        graph.get_mut(skin).unwrap().visible = false;

        let visible: Vec<_> = graph.traverse_visible(graph.root()).collect();
        assert_eq!(visible.len(), 3);
        assert!(!graph.is_effectively_visible(find(&graph, "Head")));
        assert!(graph.get(find(&graph, "Head")).unwrap().visible);
    }

    #[test]
    fn test_world_transforms_and_bounds_compose() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());
        let skeleton = find(&graph, "Skeleton");
        let bone = graph.children(skeleton).next().unwrap();

        let world = graph.world_transform(bone).unwrap();
        assert_eq!(world.w.truncate(), Vector3::new(5.0, 0.0, 0.0));

        let root_bounds = graph.world_bounds(graph.root()).unwrap();
        assert_eq!(root_bounds.min, Vector3::new(-0.5, -0.5, -0.5));
        assert_eq!(root_bounds.max, Vector3::new(5.5, 2.5, 0.5));
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());
        let head = find(&graph, "Head");

        let chain: Vec<_> = graph
            .ancestors(head)
            .map(|id| graph.display_name(id).unwrap())
            .collect();
        assert_eq!(chain, ["Skin", "Root"]);
    }

    #[test]
    fn test_reload_invalidates_ids_and_resets_root() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());
        let head = find(&graph, "Head");
        let root = graph.root();
        graph.get_mut(root).unwrap().visible = false;

        graph.load_subtree(sample());
        assert!(graph.get(head).is_none());
        assert!(graph.get(graph.root()).unwrap().visible);
        assert_eq!(graph.len(), 6);
    }

    #[test]
    fn test_clear_and_statistics() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(sample());

        let stats = graph.statistics();
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.group_count, 2);
        assert_eq!(stats.mesh_count, 3);
        assert_eq!(stats.triangle_count, 36);

        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.statistics(), SceneStatistics::default());
        assert!(graph.world_bounds(graph.root()).unwrap().is_empty());
    }
}
