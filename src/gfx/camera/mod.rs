//! # Camera Module
//!
//! Orbit camera, the controller that turns pointer input into damped motion,
//! and framing of bounding boxes.

pub mod camera_controller;
pub mod camera_utils;
pub mod framing;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraManager, CameraUniform};
pub use framing::{frame, FramingOutcome};
pub use orbit_camera::OrbitCamera;
