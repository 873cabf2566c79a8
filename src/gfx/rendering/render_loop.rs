//! Per-frame driver of the viewport
//!
//! Each [`RenderLoop::tick`] runs the same three steps in order:
//!
//! 1. reconcile the viewport size with the surface and the camera aspect
//! 2. integrate pending camera-control motion
//! 3. render one frame
//!
//! The loop only talks to the window and the GPU through [`ViewportHost`] and
//! [`RenderSurface`], so it runs unchanged against test doubles.

use crate::error::{RenderError, TeardownError};
use crate::viewer::Viewer;

/// The thing the viewport lives in, usually a window
pub trait ViewportHost {
    /// Current drawable size in physical pixels
    fn measure(&self) -> (u32, u32);

    /// Stops observing the host (resize notifications, redraw requests)
    fn detach(&mut self) -> Result<(), TeardownError>;
}

/// Something frames can be rendered into
pub trait RenderSurface {
    /// Size the surface was last configured with
    fn configured_size(&self) -> (u32, u32);

    fn configure(&mut self, width: u32, height: u32);

    fn render(&mut self, viewer: &Viewer) -> Result<(), RenderError>;
}

/// What one [`RenderLoop::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered { resized: bool },
    /// Zero-sized viewport, nothing was drawn
    Skipped,
    /// Rendering failed; the error was logged
    Failed,
    /// The loop has been torn down
    Stopped,
}

#[derive(Debug)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            running: true,
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames rendered successfully
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(
        &mut self,
        host: &impl ViewportHost,
        surface: &mut impl RenderSurface,
        viewer: &mut Viewer,
    ) -> FrameStatus {
        if !self.running {
            return FrameStatus::Stopped;
        }

        let (width, height) = host.measure();
        if width == 0 || height == 0 {
            return FrameStatus::Skipped;
        }

        let resized = surface.configured_size() != (width, height);
        if resized {
            log::debug!("viewport resized to {}x{}", width, height);
            surface.configure(width, height);
            viewer.resize(width, height);
        }

        viewer.integrate_controls();

        match surface.render(viewer) {
            Ok(()) => {
                self.frames += 1;
                FrameStatus::Rendered { resized }
            }
            Err(e) => {
                log::warn!("frame {} not rendered: {}", self.frames, e);
                FrameStatus::Failed
            }
        }
    }

    /// Stops the loop and detaches from the host.
    ///
    /// Detach failures are logged, never returned. Calling this again is a
    /// no-op.
    pub fn teardown(&mut self, host: &mut impl ViewportHost) {
        if !self.running {
            return;
        }
        self.running = false;

        if let Err(e) = host.detach() {
            log::error!("viewport teardown: {}", e);
        }
        log::info!("render loop stopped after {} frames", self.frames);
    }
}
