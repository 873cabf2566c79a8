//! GPU copies of the scene's meshes
//!
//! Buffers are keyed by arena index and rebuilt whenever the graph revision
//! changes. Per-mesh uniforms (world transform and material) are refreshed
//! every frame, but only written to the GPU when they actually changed, so
//! highlight changes show up without any extra bookkeeping.

use std::collections::HashMap;

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use super::render_pass_ext::RenderPassExt;
use crate::gfx::scene::{Material, MeshNode, SceneGraph};
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

/// Per-mesh uniform content
///
/// MUST match the `MeshUniform` struct in `viewer.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
    surface: [f32; 4],
}

impl MeshUniform {
    pub fn new(world: Matrix4<f32>, material: &Material) -> Self {
        let normal = world.invert().map(|m| m.transpose()).unwrap_or(world);
        let [er, eg, eb] = material.emissive_or_black();
        Self {
            model: world.into(),
            normal: normal.into(),
            base_color: material.base_color,
            emissive: [er, eg, eb, 0.0],
            surface: [material.metallic, material.roughness, 0.0, 0.0],
        }
    }
}

/// Vertex, index and uniform buffers of one mesh node
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub uniform: UniformBuffer<MeshUniform>,
    pub bind_group: wgpu::BindGroup,
}

pub struct MeshCache {
    layout: BindGroupLayoutWithDesc,
    revision: Option<u64>,
    meshes: HashMap<usize, GpuMesh>,
}

impl MeshCache {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            layout: BindGroupLayoutBuilder::new()
                .next_binding_rendering(binding_types::uniform())
                .create(device, "Mesh Bind Group Layout"),
            revision: None,
            meshes: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Brings the cache up to date with `graph`.
    ///
    /// Returns the number of uniform buffers written.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, graph: &SceneGraph) -> usize {
        if self.revision != Some(graph.revision()) {
            self.rebuild(device, graph);
        }

        let mut writes = 0;
        for (id, mesh) in graph.meshes() {
            let (Some(gpu), Some(world)) = (self.meshes.get_mut(&id.index()), graph.world_transform(id))
            else {
                continue;
            };
            if gpu.uniform.update_content(queue, MeshUniform::new(world, &mesh.material)) {
                writes += 1;
            }
        }
        writes
    }

    fn rebuild(&mut self, device: &wgpu::Device, graph: &SceneGraph) {
        self.meshes.clear();
        for (id, mesh) in graph.meshes() {
            if mesh.geometry.triangle_count() == 0 {
                continue;
            }
            let gpu = self.upload(device, graph.display_name(id).unwrap_or("Mesh"), mesh);
            self.meshes.insert(id.index(), gpu);
        }
        self.revision = Some(graph.revision());
        log::debug!(
            "uploaded {} meshes for scene revision {}",
            self.meshes.len(),
            graph.revision()
        );
    }

    fn upload(&self, device: &wgpu::Device, name: &str, mesh: &MeshNode) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(mesh.geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = UniformBuffer::new(device);
        let bind_group = BindGroupBuilder::new(&self.layout)
            .resource(uniform.binding_resource())
            .create(device, &format!("{} Bind Group", name));

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices().len() as u32,
            uniform,
            bind_group,
        }
    }

    /// Draws every effectively visible mesh in pre-order
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, graph: &SceneGraph) {
        if self.revision != Some(graph.revision()) {
            return;
        }
        for id in graph.traverse_visible(graph.root()) {
            if let Some(gpu) = self.meshes.get(&id.index()) {
                render_pass.draw_gpu_mesh(gpu);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_uniform_carries_material() {
        let material = Material::from_hex("muscle", 0xaa4444, 0.0, 1.0).with_emission([0.2, 0.2, 0.4]);
        let uniform = MeshUniform::new(Matrix4::identity(), &material);

        assert_eq!(uniform.base_color, material.base_color);
        assert_eq!(uniform.emissive, [0.2, 0.2, 0.4, 0.0]);
        assert_eq!(uniform.surface[1], 1.0);
        assert_eq!(std::mem::size_of::<MeshUniform>() % 16, 0);
    }

    #[test]
    fn test_missing_emissive_shades_black() {
        let material = Material::default().without_emissive();
        let uniform = MeshUniform::new(Matrix4::identity(), &material);
        assert_eq!(uniform.emissive, [0.0; 4]);
    }

    #[test]
    fn test_normal_matrix_undoes_scale() {
        let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0)
            * Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let uniform = MeshUniform::new(world, &Material::default());
        assert!((uniform.normal[0][0] - 0.5).abs() < 1e-6);
        assert_eq!(uniform.model[3][0], 2.0);

        let singular = Matrix4::from_scale(0.0);
        let uniform = MeshUniform::new(singular, &Material::default());
        assert_eq!(uniform.normal, uniform.model);
    }
}
