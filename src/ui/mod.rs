//! # User Interface Module
//!
//! Dear ImGui overlay of the viewer.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`panel`] - The control panel: layers, selection, loading, view and
//!   scene statistics
//!
//! While the UI has focus, pointer input does not reach the camera or
//! picking.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{viewer_panel, PanelActions, PanelState};
