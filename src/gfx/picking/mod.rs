//! # Mesh Picking
//!
//! Turns a pointer position into the nearest mesh under it.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: the position is normalized against the viewport
//!    rectangle, with the vertical axis flipped so that up is positive
//! 2. **NDC to Ray**: near and far plane points are unprojected through the
//!    inverse view-projection matrix
//! 3. **Ray to Mesh**: every visible mesh in the [`PickableIndex`] is tested,
//!    first against its world bounds, then triangle by triangle in mesh-local
//!    space
//! 4. **Selection**: the nearest hit wins; equal distances go to the mesh that
//!    comes first in pre-order
//!
//! ## Usage
//!
//! ```rust
//! use strata::gfx::picking::{pointer_to_ndc, ViewportRect};
//!
//! let rect = ViewportRect::new(0.0, 0.0, 800.0, 600.0);
//! assert_eq!(pointer_to_ndc(400.0, 0.0, &rect), Some((0.0, 1.0)));
//! ```

pub mod highlight;
pub mod ray;
pub mod selection;

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::Camera;
use crate::gfx::scene::{Aabb, MeshGeometry, NodeId, SceneGraph};
pub use highlight::HighlightState;
pub use ray::Ray;
pub use selection::Selection;

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The mesh that was hit
    pub node: NodeId,
    /// World-space distance from the near plane along the pick ray
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

/// Screen-space rectangle of the viewport, in the same units as pointer positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport covering a whole surface of the given size
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Converts a pointer position to normalized device coordinates.
///
/// `x` grows to the right and `y` grows upwards, both in `-1..=1` inside the
/// viewport. Returns `None` for a zero-sized viewport.
pub fn pointer_to_ndc(pointer_x: f32, pointer_y: f32, rect: &ViewportRect) -> Option<(f32, f32)> {
    if rect.is_empty() {
        return None;
    }
    let x = (pointer_x - rect.left) / rect.width * 2.0 - 1.0;
    let y = -((pointer_y - rect.top) / rect.height * 2.0) + 1.0;
    Some((x, y))
}

/// Builds the world-space ray through an NDC position, starting on the near
/// plane.
pub fn screen_to_ray(ndc: (f32, f32), camera: &impl Camera) -> Option<Ray> {
    let inverse = camera.build_view_projection_matrix().invert()?;
    let unproject = |depth: f32| {
        let point = inverse * Vector4::new(ndc.0, ndc.1, depth, 1.0);
        point.truncate() / point.w
    };
    // wgpu clip space puts the near plane at depth 0. Depth 0.5 lies close to
    // the near plane and stays well conditioned for any far/near ratio.
    let near = unproject(0.0);
    let ahead = unproject(0.5);
    Some(Ray::new(near, ahead - near))
}

/// A mesh as seen by the picking engine
#[derive(Debug, Clone)]
pub struct PickableEntry {
    pub node: NodeId,
    pub world: Matrix4<f32>,
    pub inverse_world: Matrix4<f32>,
    pub bounds: Aabb,
    pub geometry: Arc<MeshGeometry>,
}

/// Flat pre-order list of every pickable mesh of one scene revision.
///
/// The index is derived from the graph and replaced wholesale whenever the
/// graph is reloaded; it is never patched.
#[derive(Debug, Clone, Default)]
pub struct PickableIndex {
    entries: Vec<PickableEntry>,
    revision: u64,
}

impl PickableIndex {
    pub fn build(graph: &SceneGraph) -> Self {
        let entries = graph
            .meshes()
            .filter_map(|(node, mesh)| {
                let world = graph.world_transform(node)?;
                let Some(inverse_world) = world.invert() else {
                    log::debug!("mesh {} has a singular transform, not pickable", node.index());
                    return None;
                };
                Some(PickableEntry {
                    node,
                    world,
                    inverse_world,
                    bounds: mesh.geometry.bounds().transform(&world),
                    geometry: Arc::clone(&mesh.geometry),
                })
            })
            .collect();

        Self {
            entries,
            revision: graph.revision(),
        }
    }

    pub fn entries(&self) -> &[PickableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Something that can answer "which mesh does this ray hit first"
pub trait PickSource {
    fn pick_ray(&self, graph: &SceneGraph, ray: &Ray) -> Option<PickHit>;
}

impl PickSource for PickableIndex {
    fn pick_ray(&self, graph: &SceneGraph, ray: &Ray) -> Option<PickHit> {
        if self.revision != graph.revision() {
            log::debug!(
                "pickable index revision {} does not match scene revision {}",
                self.revision,
                graph.revision()
            );
            return None;
        }

        let mut closest: Option<PickHit> = None;
        for entry in &self.entries {
            let Some(box_distance) = entry.bounds.intersect_ray(ray) else {
                continue;
            };
            if closest.is_some_and(|hit| box_distance > hit.distance) {
                continue;
            }
            if !graph.is_effectively_visible(entry.node) {
                continue;
            }

            let local_ray = ray.transformed(&entry.inverse_world);
            let nearest = entry
                .geometry
                .triangles()
                .filter_map(|[a, b, c]| local_ray.intersect_triangle(a, b, c))
                .fold(None, |best: Option<f32>, t| {
                    Some(best.map_or(t, |b| b.min(t)))
                });

            if let Some(distance) = nearest {
                // Strictly closer only, so ties keep the earlier entry
                if closest.map_or(true, |hit| distance < hit.distance) {
                    closest = Some(PickHit {
                        node: entry.node,
                        distance,
                        point: ray.point_at(distance),
                    });
                }
            }
        }
        closest
    }
}

/// Picks the nearest visible mesh under a pointer position.
///
/// # Arguments
///
/// * `source` - The pickable meshes of the current scene
/// * `graph` - Scene the source was built from, consulted for visibility
/// * `camera` - Camera the viewport is rendered with
/// * `pointer` - Pointer position in the same space as `rect`
/// * `rect` - Viewport rectangle
pub fn pick(
    source: &impl PickSource,
    graph: &SceneGraph,
    camera: &impl Camera,
    pointer: (f32, f32),
    rect: &ViewportRect,
) -> Option<PickHit> {
    let ndc = pointer_to_ndc(pointer.0, pointer.1, rect)?;
    let ray = screen_to_ray(ndc, camera)?;
    source.pick_ray(graph, &ray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::gfx::camera::OrbitCamera;
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::scene::Material;
    use crate::loader::{DecodedNode, DecodedScene};
    use cgmath::{InnerSpace, Zero};

    fn cube(name: &str, offset: [f32; 3]) -> DecodedNode {
        DecodedNode::mesh(name, Arc::new(generate_cube().into_mesh()), Material::default())
            .with_transform(Matrix4::from_translation(Vector3::from(offset)))
    }

    /// Camera on +Z looking at the origin, square viewport
    fn front_camera() -> OrbitCamera {
        let config = ViewerConfig::default();
        let mut camera = OrbitCamera::from_config(&config, 1.0);
        camera.set_pose(Vector3::zero(), 10.0, Vector3::unit_z());
        camera
    }

    fn center_of(rect: &ViewportRect) -> (f32, f32) {
        (rect.left + rect.width / 2.0, rect.top + rect.height / 2.0)
    }

    fn name_of(graph: &SceneGraph, hit: Option<PickHit>) -> Option<String> {
        hit.and_then(|hit| graph.get(hit.node)).map(|node| node.name.clone())
    }

    #[test]
    fn test_ndc_flips_vertical_axis() {
        let rect = ViewportRect::new(100.0, 50.0, 200.0, 100.0);

        assert_eq!(pointer_to_ndc(100.0, 50.0, &rect), Some((-1.0, 1.0)));
        assert_eq!(pointer_to_ndc(300.0, 150.0, &rect), Some((1.0, -1.0)));
        assert_eq!(pointer_to_ndc(200.0, 75.0, &rect), Some((0.0, 0.5)));
        assert_eq!(pointer_to_ndc(0.0, 0.0, &ViewportRect::new(0.0, 0.0, 0.0, 10.0)), None);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = front_camera();
        let ray = screen_to_ray((0.0, 0.0), &camera).unwrap();

        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!((ray.origin.z - (10.0 - camera.znear)).abs() < 1e-3);
    }

    #[test]
    fn test_upper_half_of_viewport_picks_upper_mesh() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(
            DecodedScene::new()
                .with_root(cube("Upper", [0.0, 2.0, 0.0]))
                .with_root(cube("Lower", [0.0, -2.0, 0.0])),
        );
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        // Row 0 is the top of the viewport; the upper cube sits above center
        let upper = camera.build_view_projection_matrix() * Vector4::new(0.0, 2.0, 0.0, 1.0);
        let screen_y = (1.0 - upper.y / upper.w) / 2.0 * rect.height;
        let hit = pick(&index, &graph, &camera, (200.0, screen_y), &rect);
        assert_eq!(name_of(&graph, hit), Some("Upper".to_string()));
    }

    #[test]
    fn test_negative_space_returns_none() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(DecodedScene::new().with_root(cube("Box", [0.0, 0.0, 0.0])));
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        assert!(pick(&index, &graph, &camera, (2.0, 2.0), &rect).is_none());
        assert!(pick(&index, &graph, &camera, center_of(&rect), &rect).is_some());

        let empty = PickableIndex::build(&SceneGraph::new());
        assert!(pick(&empty, &SceneGraph::new(), &camera, center_of(&rect), &rect).is_none());
    }

    #[test]
    fn test_nearest_overlapping_mesh_wins() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(
            DecodedScene::new()
                .with_root(cube("Far", [0.0, 0.0, -3.0]))
                .with_root(cube("Near", [0.0, 0.0, 2.0])),
        );
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        let hit = pick(&index, &graph, &camera, center_of(&rect), &rect).unwrap();
        assert_eq!(graph.get(hit.node).unwrap().name, "Near");
        assert!((hit.point.z - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_mesh_whose_bounds_contain_the_eye_still_wins_when_nearer() {
        // A quad in front of the camera plus a sliver far to the side, so the
        // mesh's bounds reach past the eye
        let shell = MeshGeometry::new(
            vec![
                [-1.0, -1.0, 5.0],
                [1.0, -1.0, 5.0],
                [1.0, 1.0, 5.0],
                [-1.0, 1.0, 5.0],
                [50.0, 0.0, -20.0],
                [50.0, 1.0, 20.0],
                [50.1, 0.0, 20.0],
            ],
            None,
            vec![0, 1, 2, 0, 2, 3, 4, 5, 6],
        );
        let mut graph = SceneGraph::new();
        graph.load_subtree(
            DecodedScene::new()
                .with_root(cube("Far", [0.0, 0.0, -3.0]))
                .with_root(DecodedNode::mesh("Shell", Arc::new(shell), Material::default())),
        );
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        let hit = pick(&index, &graph, &camera, center_of(&rect), &rect).unwrap();
        assert_eq!(graph.get(hit.node).unwrap().name, "Shell");
        assert!((hit.point.z - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_exact_tie_goes_to_first_in_preorder() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(
            DecodedScene::new()
                .with_root(DecodedNode::group("A").with_child(cube("First", [0.0, 0.0, 0.0])))
                .with_root(cube("Second", [0.0, 0.0, 0.0])),
        );
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        for _ in 0..3 {
            let hit = pick(&index, &graph, &camera, center_of(&rect), &rect);
            assert_eq!(name_of(&graph, hit), Some("First".to_string()));
        }
    }

    #[test]
    fn test_hidden_meshes_are_not_pickable() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(
            DecodedScene::new()
                .with_root(DecodedNode::group("Front").with_child(cube("Near", [0.0, 0.0, 2.0])))
                .with_root(cube("Far", [0.0, 0.0, -3.0])),
        );
        let index = PickableIndex::build(&graph);
        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);

        let front = graph.children(graph.root()).next().unwrap();
        graph.get_mut(front).unwrap().visible = false;

        let hit = pick(&index, &graph, &camera, center_of(&rect), &rect);
        assert_eq!(name_of(&graph, hit), Some("Far".to_string()));
    }

    #[test]
    fn test_stale_index_picks_nothing() {
        let mut graph = SceneGraph::new();
        graph.load_subtree(DecodedScene::new().with_root(cube("Box", [0.0, 0.0, 0.0])));
        let index = PickableIndex::build(&graph);
        graph.load_subtree(DecodedScene::new().with_root(cube("Box", [0.0, 0.0, 0.0])));

        let camera = front_camera();
        let rect = ViewportRect::new(0.0, 0.0, 400.0, 400.0);
        assert!(pick(&index, &graph, &camera, center_of(&rect), &rect).is_none());
    }
}
