// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The frame driver ([`RenderLoop`]), the wgpu engine behind it, and the GPU
//! copies of the scene's meshes.

pub mod mesh_cache;
pub mod pipeline_manager;
pub mod render_engine;
pub mod render_loop;
pub mod render_pass_ext;

pub use pipeline_manager::{PipelineConfig, PipelineManager, VertexLayout};
pub use render_engine::RenderEngine;
pub use render_loop::{FrameStatus, RenderLoop, RenderSurface, ViewportHost};
