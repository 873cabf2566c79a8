//! Axis-aligned bounding boxes

use cgmath::{ElementWise, InnerSpace, Matrix4, Vector3, Vector4};

use crate::gfx::picking::ray::Ray;

/// Axis-aligned bounding box
///
/// An empty box has `min > max` on every axis and absorbs nothing; unioning
/// with it is the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// A cube with edge length `size` centered at the origin
    pub fn centered_cube(size: f32) -> Self {
        let half = size * 0.5;
        Self::new(Vector3::new(-half, -half, -half), Vector3::new(half, half, half))
    }

    /// Create AABB from a set of vertices
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand(Vector3::new(point[0], point[1], point[2]));
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True for boxes that cannot be framed: empty, non-finite or without extent.
    pub fn is_degenerate(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let finite = [self.min, self.max]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
        !finite || self.max_dimension() <= f32::EPSILON
    }

    pub fn expand(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let mut merged = *self;
        merged.expand(other.min);
        merged.expand(other.max);
        merged
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::new(0.0, 0.0, 0.0)
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::new(0.0, 0.0, 0.0)
        } else {
            (self.min + self.max) * 0.5
        }
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Radius of the sphere through all eight corners
    pub fn bounding_radius(&self) -> f32 {
        self.size().magnitude() * 0.5
    }

    pub fn corners(&self) -> [Vector3<f32>; 8] {
        [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Test ray-AABB intersection
    ///
    /// Returns the ray parameter where the ray enters the box, `0.0` when the
    /// origin is already inside, or `None` if the box is missed or behind.
    /// No point of the box along the ray lies closer than the returned value.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        if self.is_empty() {
            return *self;
        }

        let mut transformed = Self::empty();
        for corner in &self.corners() {
            let homogeneous = matrix * Vector4::new(corner.x, corner.y, corner.z, 1.0);
            transformed.expand(homogeneous.truncate() / homogeneous.w);
        }
        transformed
    }
}
