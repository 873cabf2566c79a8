//! Documents and scenes shared by the integration tests

use std::sync::Arc;

use cgmath::{Matrix4, Vector3};
use strata::gfx::geometry::generate_cube;
use strata::gfx::scene::Material;
use strata::loader::{DecodedNode, DecodedScene};

/// Packs a JSON chunk and a binary chunk into a GLB container
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    json.resize(json.len().next_multiple_of(4), b' ');
    let mut bin = bin.to_vec();
    bin.resize(bin.len().next_multiple_of(4), 0);

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

/// A quad split into two triangles, hanging under an "Outer" group
pub fn quad_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    for v in [[-1.0f32, -1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2, 0, 2, 3] {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let json = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "Outer", "children": [1]},
            {"name": "Panel", "mesh": 0}
        ],
        "meshes": [{"name": "PanelMesh", "primitives": [
            {"attributes": {"POSITION": 0}, "indices": 1}
        ]}],
        "buffers": [{"byteLength": 60}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 48},
            {"buffer": 0, "byteOffset": 48, "byteLength": 12}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
             "min": [-1.0, -1.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR"}
        ]
    }"#;
    glb(json, &bin)
}

pub const TRIANGLE_OBJ: &str = "\
o Wedge
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

pub fn cube(name: &str, offset: [f32; 3]) -> DecodedNode {
    DecodedNode::mesh(name, Arc::new(generate_cube().into_mesh()), Material::default())
        .with_transform(Matrix4::from_translation(Vector3::from(offset)))
}

/// Two unit cubes on the Z axis inside a "Parts" group, "Near" closer to
/// the default viewing direction than "Far"
pub fn stacked_cubes() -> DecodedScene {
    DecodedScene::new().with_root(
        DecodedNode::group("Parts")
            .with_child(cube("Far", [0.0, 0.0, 0.0]))
            .with_child(cube("Near", [0.0, 0.0, 2.0])),
    )
}
