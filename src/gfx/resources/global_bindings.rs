//! Global uniform bindings for camera and lighting
//!
//! Bound to slot 0 of every pipeline. The light rig is a hemisphere light
//! (sky and ground colors blended by the surface normal) plus a key and a
//! fill directional light.

use cgmath::{InnerSpace, Vector3};

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    gfx::scene::material::rgb_from_hex,
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in `viewer.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// rgb + hemisphere intensity
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    /// direction towards the light + intensity
    key_light: [f32; 4],
    fill_light: [f32; 4],
}

/// A directional light, given by the position it shines from
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    fn packed(&self) -> [f32; 4] {
        let direction = Vector3::from(self.position);
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            Vector3::unit_y()
        };
        [direction.x, direction.y, direction.z, self.intensity]
    }
}

/// Lighting of the viewport
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightRig {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            sky_color: rgb_from_hex(0xffffff),
            ground_color: rgb_from_hex(0x222233),
            hemisphere_intensity: 0.6,
            key: DirectionalLight {
                position: [3.0, 5.0, 2.0],
                intensity: 1.0,
            },
            fill: DirectionalLight {
                position: [-3.0, 2.0, -2.0],
                intensity: 0.5,
            },
        }
    }
}

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, lights: &LightRig) -> Self {
        let [sr, sg, sb] = lights.sky_color;
        let [gr, gg, gb] = lights.ground_color;
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            sky_color: [sr, sg, sb, lights.hemisphere_intensity],
            ground_color: [gr, gg, gb, 1.0],
            key_light: lights.key.packed(),
            fill_light: lights.fill.packed(),
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Layout and bind group of the global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
