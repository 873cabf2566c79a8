//! # Mesh Geometry
//!
//! Immutable, shareable triangle geometry. The same [`MeshGeometry`] is used by
//! the picking engine (CPU ray tests) and by the renderer (GPU upload), so
//! picking always sees exactly the triangles that are drawn.

use cgmath::{InnerSpace, Vector3};

use super::bounds::Aabb;
use super::vertex::Vertex3D;

/// Indexed triangle list in mesh-local space
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl MeshGeometry {
    /// Builds a mesh, generating smooth normals when none are supplied.
    ///
    /// # Arguments
    ///
    /// * `positions` - Vertex positions
    /// * `normals` - Per-vertex normals; ignored unless there is one per position
    /// * `indices` - Triangle list indices; a trailing partial triangle is dropped
    pub fn new(positions: Vec<[f32; 3]>, normals: Option<Vec<[f32; 3]>>, mut indices: Vec<u32>) -> Self {
        indices.truncate(indices.len() - indices.len() % 3);

        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => calculate_vertex_normals(&positions, &indices),
        };
        let bounds = Aabb::from_points(&positions);

        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Local-space bounds of all vertex positions
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the triangles as corner positions, skipping triangles that
    /// reference vertices outside the position list.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let corner = |i: u32| self.positions.get(i as usize).map(|p| Vector3::from(*p));
            Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?])
        })
    }

    /// Interleaves positions and normals for GPU upload
    pub fn vertices(&self) -> Vec<Vertex3D> {
        self.positions
            .iter()
            .zip(&self.normals)
            .map(|(position, normal)| Vertex3D {
                position: *position,
                normal: *normal,
            })
            .collect()
    }
}

/// Area-weighted smooth normals; vertices not used by any triangle point up.
fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vector3::from(positions[a]),
            Vector3::from(positions[b]),
            Vector3::from(positions[c]),
        );
        let face_normal = (pb - pa).cross(pc - pa);
        for vertex in [a, b, c] {
            accumulated[vertex] += face_normal;
        }
    }

    accumulated
        .into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON * f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}
