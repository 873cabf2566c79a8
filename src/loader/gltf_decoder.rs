//! glTF 2.0 decoding
//!
//! Both the binary container and the JSON form are accepted. Buffers must be
//! embedded (GLB blob or `data:` URIs); external files are not resolved.
//!
//! Node mapping:
//! - a node without a mesh becomes a group
//! - a node whose mesh has a single triangle primitive becomes a mesh node
//! - a node whose mesh has several primitives becomes a group with one mesh
//!   child per primitive
//!
//! Children follow in document order below the node they belong to.

use std::collections::HashSet;
use std::sync::Arc;

use cgmath::Matrix4;
use gltf::mesh::Mode;

use super::{DecodedNode, DecodedScene, SceneDecoder};
use crate::error::DecodeError;
use crate::gfx::scene::{Material, MeshGeometry};

/// Decoder for `.glb` and `.gltf` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfDecoder;

impl SceneDecoder for GltfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedScene, DecodeError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
        let buffers = gltf::import_buffers(&document, None, blob)?;

        let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
            log::warn!("glTF document contains no scene");
            return Ok(DecodedScene::new());
        };

        let mut context = DecodeContext {
            buffers: &buffers,
            visited: HashSet::new(),
        };
        let roots = scene
            .nodes()
            .map(|node| context.node(node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DecodedScene { roots })
    }
}

struct DecodeContext<'a> {
    buffers: &'a [gltf::buffer::Data],
    visited: HashSet<usize>,
}

impl DecodeContext<'_> {
    fn node(&mut self, node: gltf::Node<'_>) -> Result<DecodedNode, DecodeError> {
        if !self.visited.insert(node.index()) {
            return Err(DecodeError::InvalidHierarchy { node: node.index() });
        }

        let name = node.name().unwrap_or_default().to_string();
        let transform = Matrix4::from(node.transform().matrix());

        let mut decoded = match node.mesh() {
            Some(mesh) => self.mesh(&name, mesh)?,
            None => DecodedNode::group(name),
        }
        .with_transform(transform);

        for child in node.children() {
            decoded.children.push(self.node(child)?);
        }
        Ok(decoded)
    }

    fn mesh(&self, node_name: &str, mesh: gltf::Mesh<'_>) -> Result<DecodedNode, DecodeError> {
        let mesh_name = mesh.name().unwrap_or(node_name);
        let mut primitives = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::warn!(
                    "skipping {:?} primitive of mesh '{}', only triangles are supported",
                    primitive.mode(),
                    mesh_name
                );
                continue;
            }
            let geometry = self.geometry(mesh_name, &primitive)?;
            primitives.push((Arc::new(geometry), material(&primitive.material())));
        }

        if primitives.len() == 1 {
            let (geometry, material) = primitives.remove(0);
            return Ok(DecodedNode::mesh(node_name, geometry, material));
        }

        Ok(DecodedNode::group(node_name).with_children(
            primitives
                .into_iter()
                .map(|(geometry, material)| DecodedNode::mesh(mesh_name, geometry, material)),
        ))
    }

    fn geometry(
        &self,
        mesh_name: &str,
        primitive: &gltf::Primitive<'_>,
    ) -> Result<MeshGeometry, DecodeError> {
        let reader = primitive.reader(|buffer| {
            self.buffers
                .get(buffer.index())
                .map(|data| data.0.as_slice())
        });

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| DecodeError::MissingPositions {
                mesh: mesh_name.to_string(),
            })?
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(DecodeError::IndexOutOfRange {
                mesh: mesh_name.to_string(),
                index,
                count: positions.len(),
            });
        }

        Ok(MeshGeometry::new(positions, normals, indices))
    }
}

fn material(material: &gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material::new(
        material.name().unwrap_or("default"),
        pbr.base_color_factor(),
        pbr.metallic_factor(),
        pbr.roughness_factor(),
    )
    .with_emission(material.emissive_factor())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::loader::decode;

    /// Packs a JSON document and binary chunk into a GLB container
    pub(crate) fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    /// One triangle under a "Skin" group, indexed with u16
    pub(crate) fn triangle_glb(max_index: u16) -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, max_index] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);

        let json = r#"{
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [
                {"name": "Skin", "children": [1]},
                {"name": "Tri", "mesh": 0, "translation": [0.0, 1.0, 0.0]}
            ],
            "meshes": [{"name": "TriMesh", "primitives": [
                {"attributes": {"POSITION": 0}, "indices": 1, "material": 0}
            ]}],
            "materials": [{
                "name": "red",
                "pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0], "metallicFactor": 0.0},
                "emissiveFactor": [0.0, 0.0, 0.1]
            }],
            "buffers": [{"byteLength": 44}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ]
        }"#;
        glb(json, &bin)
    }

    #[test]
    fn test_glb_hierarchy_and_material() {
        let scene = decode(&triangle_glb(2), None).unwrap();

        assert_eq!(scene.roots.len(), 1);
        let skin = &scene.roots[0];
        assert_eq!(skin.name, "Skin");
        let tri = &skin.children[0];
        assert_eq!(tri.name, "Tri");
        assert_eq!(tri.transform.w.y, 1.0);

        let crate::gfx::scene::NodeKind::Mesh(mesh) = &tri.kind else {
            panic!("expected a mesh node");
        };
        assert_eq!(mesh.geometry.triangle_count(), 1);
        assert_eq!(mesh.material.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.material.emissive, Some([0.0, 0.0, 0.1]));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let result = GltfDecoder.decode(&triangle_glb(7));
        assert!(matches!(
            result,
            Err(DecodeError::IndexOutOfRange { index: 7, count: 3, .. })
        ));
    }

    #[test]
    fn test_json_document_without_buffers() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0, 1]}],
            "nodes": [{"name": "Muscles"}, {}]
        }"#;
        let scene = decode(json, None).unwrap();

        assert_eq!(scene.roots.len(), 2);
        assert_eq!(scene.roots[0].name, "Muscles");
        assert!(scene.roots[1].name.is_empty());
    }

    #[test]
    fn test_truncated_container_fails() {
        let bytes = triangle_glb(2);
        assert!(decode(&bytes[..bytes.len() / 2], None).is_err());
    }
}
