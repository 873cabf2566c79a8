// src/lib.rs
//! Strata
//!
//! An interactive 3D model viewer built on wgpu and winit. Models (glTF, GLB
//! or OBJ) are loaded in the background, framed automatically and can be
//! explored layer by layer; clicking a mesh highlights it and reports its
//! place in the hierarchy.
//!
//! The [`Viewer`] holds all viewport state and works without a window, which
//! is how the tests drive it. [`StrataApp`] puts it in a window.

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod prelude;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

pub use app::StrataApp;
pub use config::{LoadOrdering, ViewerConfig};
pub use viewer::{LoadOutcome, Viewer};
