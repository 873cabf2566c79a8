//! Wavefront OBJ decoding
//!
//! Every `o`/`g` model of the file becomes one top-level mesh node, so OBJ
//! scenes have no layers besides the whole model. Material libraries are not
//! resolved; all meshes get the default material.

use std::io::Cursor;
use std::sync::Arc;

use super::{DecodedNode, DecodedScene, SceneDecoder};
use crate::error::DecodeError;
use crate::gfx::scene::{Material, MeshGeometry};

/// Decoder for `.obj` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjDecoder;

impl SceneDecoder for ObjDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedScene, DecodeError> {
        let mut reader = Cursor::new(bytes);
        let (models, materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )?;
        if let Err(e) = materials {
            log::debug!("OBJ material library ignored: {}", e);
        }

        let mut scene = DecodedScene::new();
        for model in models {
            let mesh = &model.mesh;
            if mesh.positions.is_empty() {
                log::debug!("skipping OBJ model '{}' without vertices", model.name);
                continue;
            }

            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let normals = (!mesh.normals.is_empty()).then(|| {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect::<Vec<_>>()
            });

            if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(DecodeError::IndexOutOfRange {
                    mesh: model.name.clone(),
                    index,
                    count: positions.len(),
                });
            }

            let geometry = MeshGeometry::new(positions, normals, mesh.indices.clone());
            scene = scene.with_root(DecodedNode::mesh(
                model.name.clone(),
                Arc::new(geometry),
                Material::default(),
            ));
        }
        Ok(scene)
    }
}
