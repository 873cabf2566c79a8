//! Rays and ray–triangle intersection

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized for world-space rays)
    pub direction: Vector3<f32>,
}

const TRIANGLE_EPSILON: f32 = 1e-7;

impl Ray {
    /// Create a new ray with a normalized direction
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Moves the ray into another coordinate space.
    ///
    /// The direction is not renormalized. For an affine `matrix` a hit at
    /// parameter `t` on the transformed ray lies at parameter `t` on this
    /// ray, so parameters found in mesh-local space compare across meshes.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Ray {
        let origin = matrix * Vector4::new(self.origin.x, self.origin.y, self.origin.z, 1.0);
        let direction =
            matrix * Vector4::new(self.direction.x, self.direction.y, self.direction.z, 0.0);
        Ray {
            origin: origin.truncate() / origin.w,
            direction: direction.truncate(),
        }
    }

    /// Möller–Trumbore ray/triangle test, both faces count as hits.
    ///
    /// Returns the ray parameter of the hit if it lies strictly in front of the
    /// origin.
    pub fn intersect_triangle(
        &self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > TRIANGLE_EPSILON).then_some(t)
    }
}
