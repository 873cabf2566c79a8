//! Fitting the camera to a bounding box

use cgmath::Vector3;

use super::orbit_camera::OrbitCamera;
use crate::config::ViewerConfig;
use crate::gfx::scene::bounds::Aabb;

/// Edge length of the box framed when a model has no usable extent
pub const DEFAULT_BOX_SIZE: f32 = 1.0;

const FAR_FACTOR: f32 = 100.0;
const MIN_NEAR: f32 = 1e-6;

/// What [`frame`] ended up looking at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramingOutcome {
    /// The given bounds were framed
    Framed(Aabb),
    /// The bounds were degenerate and a unit box at the origin was framed instead
    DefaultBox,
}

/// Moves the camera so all of `bounds` is in view.
///
/// The camera looks at the box center from the configured view direction.
/// The distance puts the sphere enclosing the box inside the narrower of the
/// two fields of view, padded by `framing_margin`. Orbit distance limits are
/// rescaled to the box size. The configured clip planes are widened when the
/// framed distance would put the model in front of `near` or beyond `far`.
pub fn frame(camera: &mut OrbitCamera, bounds: Aabb, config: &ViewerConfig) -> FramingOutcome {
    let (target_box, outcome) = if bounds.is_degenerate() {
        log::warn!(
            "degenerate model bounds (min {:?}, max {:?}), framing a default box",
            bounds.min,
            bounds.max
        );
        (Aabb::centered_cube(DEFAULT_BOX_SIZE), FramingOutcome::DefaultBox)
    } else {
        (bounds, FramingOutcome::Framed(bounds))
    };

    let radius = target_box.bounding_radius();
    let half_fov = (camera.fovy.0 * 0.5).min(camera.fovx().0 * 0.5);
    let distance = config.framing_margin * radius / half_fov.sin();

    camera.set_distance_bounds(radius * 0.05, distance * 20.0);
    // Near sits at most halfway to the enclosing sphere; far shrinks with it
    // so the configured depth ratio is kept
    camera.znear = config.near.min((distance - radius) * 0.5).max(MIN_NEAR);
    camera.zfar = (config.far * (camera.znear / config.near.max(MIN_NEAR))).max(distance * FAR_FACTOR);
    let [x, y, z] = config.view_direction;
    camera.set_pose(target_box.center(), distance, Vector3::new(x, y, z));
    camera.update_view_proj();

    log::debug!(
        "framed box centered at {:?}, radius {:.3}, distance {:.3}, clip {:.2e}..{:.2e}",
        target_box.center(),
        radius,
        distance,
        camera.znear,
        camera.zfar
    );
    outcome
}
