use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::ViewerConfig;
use cgmath::*;

/// Remaps clip-space depth from OpenGL's `-1..1` to wgpu's `0..1`.
///
/// `Matrix4::new` takes columns, so the depth terms sit in the last two.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Camera orbiting a target point in a Y-up world
///
/// `eye` is derived from `target`, `distance`, `pitch` and `yaw`; the
/// projection parameters persist across framing and reloads.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera.update_view_proj();
        camera
    }

    /// Camera with the configured projection, looking at the origin
    pub fn from_config(config: &ViewerConfig, aspect: f32) -> Self {
        let mut camera = Self::new(5.0, 0.0, 0.0, Vector3::zero(), aspect);
        camera.fovy = Rad(config.fov_radians());
        camera.znear = config.near;
        camera.zfar = config.far;
        let [x, y, z] = config.view_direction;
        camera.set_pose(Vector3::zero(), 5.0, Vector3::new(x, y, z));
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    /// Perspective projection mapping depth to wgpu's `0..1` range
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Horizontal field of view implied by `fovy` and `aspect`
    pub fn fovx(&self) -> Rad<f32> {
        Rad(2.0 * ((self.fovy.0 * 0.5).tan() * self.aspect).atan())
    }

    /// Places the camera at `distance` from `target` along `direction`.
    ///
    /// # Arguments
    ///
    /// * `target` - Point to orbit around
    /// * `distance` - Eye distance, clamped to the orbit bounds
    /// * `direction` - Direction from the target towards the eye, need not be normalized
    pub fn set_pose(&mut self, target: Vector3<f32>, distance: f32, direction: Vector3<f32>) {
        let direction = if direction.magnitude2() > f32::EPSILON {
            direction.normalize()
        } else {
            Vector3::unit_z()
        };
        self.target = target;
        self.yaw = direction.x.atan2(direction.z);
        self.pitch = direction
            .y
            .asin()
            .clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.set_distance(distance);
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Scales the distance by `1 + delta`; negative values move closer.
    pub fn dolly(&mut self, delta: f32) {
        let factor = (1.0 + delta).max(0.05);
        self.set_distance(self.distance * factor);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;
        let movement = (right * delta.0 + up * delta.1) * pan_scale;

        self.target += movement;
        self.update();
    }

    /// Rescales the distance limits around a framed object of `radius`
    pub fn set_distance_bounds(&mut self, min: f32, max: f32) {
        self.bounds.min_distance = Some(min.max(f32::EPSILON));
        self.bounds.max_distance = Some(max.max(min));
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}
