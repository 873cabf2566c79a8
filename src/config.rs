//! Viewer configuration
//!
//! All tunables of the viewer live in [`ViewerConfig`]. Defaults give a 45°
//! field of view on a dark background with damped orbit controls.

use std::time::Duration;

/// How completions of overlapping model loads are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrdering {
    /// Whichever completion is processed last defines the scene.
    #[default]
    LastCompletionWins,
    /// Only the most recently requested load may attach its result; older
    /// completions are discarded when they arrive.
    LatestRequestWins,
}

/// Configuration for a [`Viewer`](crate::viewer::Viewer) and the window that hosts it
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Padding factor applied when framing a model (1.0 = touching the view edges)
    pub framing_margin: f32,
    /// Direction from the framed object's center towards the camera
    pub view_direction: [f32; 3],
    /// Emissive color written into a picked mesh's material
    pub highlight_tint: [f32; 3],
    /// Orbit damping factor in `(0, 1]`, `None` applies drag input immediately
    pub damping: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Number of ancestor names reported for a selection
    pub ancestor_depth: usize,
    pub clear_color: [f64; 4],
    pub load_ordering: LoadOrdering,
    pub vsync: bool,
    /// Upper bound on the size of a fetched model
    pub max_fetch_bytes: u64,
    pub fetch_timeout: Duration,
    /// Initial logical window size
    pub window_size: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            framing_margin: 1.15,
            view_direction: [0.0, 0.1, 1.0],
            highlight_tint: [0.2, 0.2, 0.4],
            damping: Some(0.1),
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
            ancestor_depth: 4,
            clear_color: [0.067, 0.067, 0.067, 1.0],
            load_ordering: LoadOrdering::default(),
            vsync: true,
            max_fetch_bytes: 256 * 1024 * 1024,
            fetch_timeout: Duration::from_secs(30),
            window_size: (1200, 800),
        }
    }
}

impl ViewerConfig {
    pub fn with_fov_degrees(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees.clamp(1.0, 179.0);
        self
    }

    pub fn with_framing_margin(mut self, margin: f32) -> Self {
        self.framing_margin = margin.max(1.0);
        self
    }

    pub fn with_highlight_tint(mut self, tint: [f32; 3]) -> Self {
        self.highlight_tint = tint;
        self
    }

    /// Sets the orbit damping factor, `None` disables inertia
    pub fn with_damping(mut self, damping: Option<f32>) -> Self {
        self.damping = damping.map(|factor| factor.clamp(f32::EPSILON, 1.0));
        self
    }

    pub fn with_load_ordering(mut self, ordering: LoadOrdering) -> Self {
        self.load_ordering = ordering;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_clamp_values() {
        let config = ViewerConfig::default()
            .with_framing_margin(0.2)
            .with_damping(Some(4.0))
            .with_fov_degrees(500.0);

        assert_eq!(config.framing_margin, 1.0);
        assert_eq!(config.damping, Some(1.0));
        assert_eq!(config.fov_degrees, 179.0);
    }

    #[test]
    fn test_default_ordering_is_last_completion() {
        assert_eq!(
            ViewerConfig::default().load_ordering,
            LoadOrdering::LastCompletionWins
        );
    }
}
