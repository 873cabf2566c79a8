//! # Primitive Shape Generation
//!
//! All shapes are centered at the origin in a Y-up frame with outward normals.

use super::GeometryData;
use crate::gfx::scene::vertex::LineVertex;
use std::f32::consts::{FRAC_PI_2, PI};

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes and one normal
/// per face.
pub fn generate_cube() -> GeometryData {
    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut data = GeometryData::new();
    for (normal, u, v) in faces {
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            data.vertices.push([
                normal[0] * 0.5 + u[0] * su + v[0] * sv,
                normal[1] * 0.5 + u[1] * su + v[1] * sv,
                normal[2] * 0.5 + u[2] * su + v[2] * sv,
            ]);
            data.normals.push(normal);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let lat_segs = latitude_segments.max(2);
    let profile: Vec<([f32; 2], [f32; 2])> = (0..=lat_segs)
        .map(|lat| {
            // From the north pole down to the south pole
            let theta = lat as f32 * PI / lat_segs as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            (
                [radius * sin_theta, radius * cos_theta],
                [sin_theta, cos_theta],
            )
        })
        .collect();
    revolve(&profile, longitude_segments)
}

/// Generate a capped cylinder along the Y axis
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height of the cylinder, from -height/2 to height/2
/// * `segments` - Number of circular segments
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let half = height * 0.5;
    // Caps get their own rings so their normals stay flat
    let profile = [
        ([0.0, half], [0.0, 1.0]),
        ([radius, half], [0.0, 1.0]),
        ([radius, half], [1.0, 0.0]),
        ([radius, -half], [1.0, 0.0]),
        ([radius, -half], [0.0, -1.0]),
        ([0.0, -half], [0.0, -1.0]),
    ];
    revolve(&profile, segments)
}

/// Generate a capsule along the Y axis
///
/// # Arguments
/// * `radius` - Radius of the body and of both hemispherical ends
/// * `length` - Length of the straight middle section
/// * `cap_segments` - Rings per hemisphere
/// * `radial_segments` - Segments around the Y axis
pub fn generate_capsule(
    radius: f32,
    length: f32,
    cap_segments: u32,
    radial_segments: u32,
) -> GeometryData {
    let caps = cap_segments.max(1);
    let half = length * 0.5;
    let mut profile = Vec::with_capacity(2 * (caps as usize + 1));

    // Top hemisphere from the pole down to the equator, then the bottom one
    for (center, start, end) in [(half, FRAC_PI_2, 0.0), (-half, 0.0, -FRAC_PI_2)] {
        for i in 0..=caps {
            let angle = start + (end - start) * i as f32 / caps as f32;
            let (sin_a, cos_a) = angle.sin_cos();
            profile.push(([radius * cos_a, center + radius * sin_a], [cos_a, sin_a]));
        }
    }
    revolve(&profile, radial_segments)
}

/// Sweeps a (radius, height) profile with matching (radial, vertical)
/// normals around the Y axis. Profile points run top to bottom.
fn revolve(profile: &[([f32; 2], [f32; 2])], segments: u32) -> GeometryData {
    let segs = segments.max(3);
    let mut data = GeometryData::new();

    for ([r, y], [nr, ny]) in profile {
        for seg in 0..=segs {
            let phi = seg as f32 * 2.0 * PI / segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            data.vertices.push([r * cos_phi, *y, r * sin_phi]);
            data.normals.push([nr * cos_phi, *ny, nr * sin_phi]);
        }
    }

    let ring = segs + 1;
    for row in 0..profile.len().saturating_sub(1) as u32 {
        for seg in 0..segs {
            let first = row * ring + seg;
            let second = first + ring;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a square line grid on the XZ plane
///
/// # Arguments
/// * `size` - Edge length of the grid
/// * `divisions` - Number of cells along each edge
/// * `center_color` - Color of the two lines through the origin
/// * `line_color` - Color of every other line
///
/// Returns pairs of vertices for a line list.
pub fn generate_grid_lines(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    line_color: [f32; 3],
) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let mut lines = Vec::with_capacity(4 * (divisions as usize + 1));

    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        let color = if 2 * i == divisions {
            center_color
        } else {
            line_color
        };
        lines.extend_from_slice(&[
            LineVertex { position: [-half, 0.0, offset], color },
            LineVertex { position: [half, 0.0, offset], color },
            LineVertex { position: [offset, 0.0, -half], color },
            LineVertex { position: [offset, 0.0, half], color },
        ]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_radius(data: &GeometryData) -> f32 {
        data.vertices
            .iter()
            .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
        for v in &cube.vertices {
            assert!(v.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(0.5, 8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert!((max_radius(&sphere) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_cylinder_is_y_up() {
        let cylinder = generate_cylinder(0.03, 0.4, 12);
        let mesh = cylinder.into_mesh();
        let bounds = mesh.bounds();
        assert!((bounds.size().y - 0.4).abs() < 1e-5);
        assert!((bounds.size().x - 0.06).abs() < 1e-5);
    }

    #[test]
    fn test_capsule_extent() {
        let capsule = generate_capsule(0.18, 0.5, 4, 16).into_mesh();
        let size = capsule.bounds().size();
        assert!((size.y - (0.5 + 2.0 * 0.18)).abs() < 1e-5);
        assert!((size.x - 0.36).abs() < 1e-5);
    }

    #[test]
    fn test_grid_lines() {
        let grid = generate_grid_lines(10.0, 10, [1.0; 3], [0.5; 3]);
        assert_eq!(grid.len(), 44);
        assert_eq!(grid[0].position, [-5.0, 0.0, -5.0]);
        assert_eq!(grid.iter().filter(|v| v.color == [1.0; 3]).count(), 4);
    }
}
