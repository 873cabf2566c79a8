//! Render pass extensions for drawing cached meshes

use wgpu::*;

use super::mesh_cache::GpuMesh;

/// Bind group slot of the per-mesh uniforms
pub const MESH_BIND_GROUP: u32 = 1;

pub trait RenderPassExt {
    /// Binds a mesh's uniforms and buffers and draws it
    fn draw_gpu_mesh(&mut self, mesh: &GpuMesh);
}

impl RenderPassExt for RenderPass<'_> {
    fn draw_gpu_mesh(&mut self, mesh: &GpuMesh) {
        self.set_bind_group(MESH_BIND_GROUP, &mesh.bind_group, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
