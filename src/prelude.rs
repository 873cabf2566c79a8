//! # Strata Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! viewer.load_scene(demo_scene());
//! assert_eq!(viewer.layers().len(), 3);
//! ```

pub use crate::app::StrataApp;
pub use crate::config::{LoadOrdering, ViewerConfig};
pub use crate::demo::demo_scene;
pub use crate::error::{DecodeError, FetchError, LoadError, LoadResult};
pub use crate::viewer::{LoadOutcome, Viewer, NOTHING_SELECTED};

pub use crate::gfx::camera::{CameraManager, FramingOutcome};
pub use crate::gfx::picking::{PickHit, Selection, ViewportRect};
pub use crate::gfx::scene::{
    Aabb, LayerToggle, Material, MeshGeometry, NodeId, NodeKind, SceneGraph, SceneStatistics,
};
pub use crate::loader::{DecodedNode, DecodedScene, LoadQueue, LoadTicket};

pub use cgmath::{Matrix4, Vector3};
