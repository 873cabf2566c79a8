// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Depth buffers and the globally bound camera and light uniforms.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent, LightRig};
pub use texture_resource::TextureResource;
