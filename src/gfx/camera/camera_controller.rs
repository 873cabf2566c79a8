use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;
use crate::config::ViewerConfig;

// Pixel scroll deltas are reduced to roughly one line step per 50 px
const PIXELS_PER_LINE: f32 = 50.0;
const REST_THRESHOLD: f32 = 1e-5;

/// Turns pointer input into orbit, pan and zoom motion.
///
/// Input only accumulates velocity. [`CameraController::integrate`] applies a
/// `damping` fraction of it to the camera once per frame and keeps the rest
/// for later frames, so motion glides to a stop. Without damping all pending
/// motion is applied on the next integration.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping: Option<f32>,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    rotate_velocity: (f32, f32),
    pan_velocity: (f32, f32),
    zoom_velocity: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping: None,
            is_shift_held: false,
            is_mouse_pressed: false,
            rotate_velocity: (0.0, 0.0),
            pan_velocity: (0.0, 0.0),
            zoom_velocity: 0.0,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut controller = Self::new(config.rotate_speed, config.zoom_speed);
        controller.pan_speed = config.pan_speed;
        controller.damping = config.damping;
        controller
    }

    /// Drags only orbit or pan while the button is held
    pub fn set_mouse_pressed(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_LINE
                    }
                };
                self.zoom_velocity += scroll_amount * self.zoom_speed;
            }
            DeviceEvent::MouseMotion { delta } if self.is_mouse_pressed => {
                if self.is_shift_held {
                    // SHIFT + DRAG = PAN (move focus point)
                    self.pan_velocity.0 += -delta.0 as f32 * self.pan_speed;
                    self.pan_velocity.1 += delta.1 as f32 * self.pan_speed;
                } else {
                    // NORMAL DRAG = ROTATE (orbit around focus)
                    self.rotate_velocity.0 += -delta.0 as f32 * self.rotate_speed;
                    self.rotate_velocity.1 += delta.1 as f32 * self.rotate_speed;
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
            state,
            ..
        } = event
        {
            self.is_shift_held = *state == ElementState::Pressed;
        }
    }

    /// Applies one frame of pending motion to `camera`.
    ///
    /// Returns `true` if anything was applied.
    pub fn integrate(&mut self, camera: &mut OrbitCamera) -> bool {
        if self.is_at_rest() {
            return false;
        }
        let factor = self.damping.unwrap_or(1.0);

        let (yaw, pitch) = self.rotate_velocity;
        if yaw != 0.0 || pitch != 0.0 {
            camera.add_yaw(yaw * factor);
            camera.add_pitch(pitch * factor);
        }
        if self.pan_velocity != (0.0, 0.0) {
            camera.pan((self.pan_velocity.0 * factor, self.pan_velocity.1 * factor));
        }
        if self.zoom_velocity != 0.0 {
            camera.dolly(self.zoom_velocity * factor);
        }

        let keep = 1.0 - factor;
        let settle = |v: f32| if (v * keep).abs() < REST_THRESHOLD { 0.0 } else { v * keep };
        self.rotate_velocity = (settle(self.rotate_velocity.0), settle(self.rotate_velocity.1));
        self.pan_velocity = (settle(self.pan_velocity.0), settle(self.pan_velocity.1));
        self.zoom_velocity = settle(self.zoom_velocity);
        true
    }

    /// Drops pending motion, used when the view is reframed
    pub fn stop(&mut self) {
        self.rotate_velocity = (0.0, 0.0);
        self.pan_velocity = (0.0, 0.0);
        self.zoom_velocity = 0.0;
    }

    pub fn is_at_rest(&self) -> bool {
        self.rotate_velocity == (0.0, 0.0)
            && self.pan_velocity == (0.0, 0.0)
            && self.zoom_velocity == 0.0
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0)
    }

    #[test]
    fn test_motion_ignored_without_button() {
        let mut controller = CameraController::new(0.01, 0.1);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        assert!(controller.is_at_rest());
    }

    #[test]
    fn test_undamped_motion_applies_at_once() {
        let mut controller = CameraController::new(0.01, 0.1);
        let mut camera = camera();
        controller.set_mouse_pressed(true);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (-10.0, 0.0) });

        assert!(controller.integrate(&mut camera));
        assert!((camera.yaw - 0.1).abs() < 1e-6);
        assert!(controller.is_at_rest());
        assert!(!controller.integrate(&mut camera));
    }

    #[test]
    fn test_damped_motion_converges() {
        let mut controller = CameraController::new(0.01, 0.1);
        controller.damping = Some(0.1);
        let mut camera = camera();
        controller.set_mouse_pressed(true);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (-10.0, 0.0) });

        controller.integrate(&mut camera);
        let first_step = camera.yaw;
        assert!((first_step - 0.01).abs() < 1e-6);

        for _ in 0..500 {
            controller.integrate(&mut camera);
        }
        assert!(controller.is_at_rest());
        assert!((camera.yaw - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_wheel_zooms_in_on_positive_scroll() {
        let mut controller = CameraController::new(0.01, 0.1);
        let mut camera = camera();
        controller.process_events(&DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
        });
        controller.integrate(&mut camera);
        assert!((camera.distance - 9.0).abs() < 1e-5);
    }
}
