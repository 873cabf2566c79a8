//! # Scene Module
//!
//! The viewer's model representation: an arena scene graph of groups and
//! meshes, the geometry and materials those meshes carry, and the layer
//! toggles derived from the hierarchy.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - Root plus the loaded hierarchy, with cached world data
//! - [`MeshGeometry`] - Shared triangle geometry used for drawing and picking
//! - [`Material`] - Surface parameters including the optional emissive channel
//! - [`LayerToggle`] - Visibility switches for the top-level groups
//! - [`Aabb`] - Bounding boxes for framing and ray rejection

pub mod bounds;
pub mod graph;
pub mod layers;
pub mod material;
pub mod mesh;
pub mod vertex;

pub use bounds::Aabb;
pub use graph::{MeshNode, NodeId, NodeKind, SceneGraph, SceneNode, SceneStatistics};
pub use layers::{LayerToggle, WHOLE_MODEL_LABEL};
pub use material::Material;
pub use mesh::MeshGeometry;
pub use vertex::{LineVertex, Vertex3D};
