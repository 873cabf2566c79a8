//! # Graphics Module
//!
//! Everything between a loaded scene and pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Scene** ([`scene`]) - Arena scene graph, meshes, materials and layers
//! - **Camera System** ([`camera`]) - Orbit camera, damped controls and framing
//! - **Picking** ([`picking`]) - Pointer rays, nearest-hit search, highlight
//!   and selection
//! - **Geometry** ([`geometry`]) - Procedural primitives for the demo model
//!   and the ground grid
//! - **Rendering Pipeline** ([`rendering`]) - The frame loop and the wgpu
//!   engine behind it
//! - **Resource Management** ([`resources`]) - Depth buffer and global
//!   camera/light uniforms
//!
//! Only [`rendering`] and [`resources`] touch the GPU; the rest is plain data
//! and runs in unit tests without a device.

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
