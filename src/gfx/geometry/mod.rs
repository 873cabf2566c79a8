//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes used by the demo scene and the ground grid,
//! so the viewer has something to show without any model file.
//!
//! ## Supported Primitives
//!
//! - **Cube**: Unit cube with per-face normals
//! - **Sphere**: UV sphere with configurable radius and resolution
//! - **Cylinder**: Capped cylinder along the Y axis
//! - **Capsule**: Cylinder with hemispherical ends along the Y axis
//! - **Grid**: Line list on the XZ plane
//!
//! ## Usage
//!
//! ```rust
//! use strata::gfx::geometry::{generate_capsule, generate_sphere};
//!
//! let head = generate_sphere(0.12, 32, 16).into_mesh();
//! let torso = generate_capsule(0.18, 0.5, 8, 24).into_mesh();
//! assert!(head.triangle_count() > 0 && torso.triangle_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::mesh::MeshGeometry;

/// Generated triangle geometry, Y-up
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts into scene geometry, keeping the generated normals
    pub fn into_mesh(self) -> MeshGeometry {
        MeshGeometry::new(self.vertices, Some(self.normals), self.indices)
    }
}
