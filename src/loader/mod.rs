//! # Model Loading
//!
//! Everything between a byte buffer (or a URL) and a [`DecodedScene`] ready to
//! be swapped into the [`SceneGraph`](crate::gfx::scene::SceneGraph).
//!
//! ## Key Components
//!
//! - [`decode`] - Format detection and dispatch to the matching decoder
//! - [`GltfDecoder`] / [`ObjDecoder`] - glTF 2.0 (binary or JSON) and Wavefront OBJ
//! - [`Fetcher`] / [`HttpFetcher`] - Retrieves model bytes from URLs or local paths
//! - [`LoadQueue`] - Runs fetch and decode on worker threads and hands the
//!   results back to the thread that owns the viewer
//!
//! Decoders never touch viewer state; a failed decode leaves the current
//! scene exactly as it was.

pub mod fetch;
pub mod gltf_decoder;
pub mod obj_decoder;
pub mod queue;

use std::path::Path;
use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};

use crate::error::DecodeError;
use crate::gfx::scene::{Material, MeshGeometry, MeshNode, NodeKind};
pub use fetch::{Fetcher, HttpFetcher};
pub use gltf_decoder::GltfDecoder;
pub use obj_decoder::ObjDecoder;
pub use queue::{LoadCompletion, LoadQueue, LoadSource};

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// A decoded node and its subtree, not yet part of any scene graph
#[derive(Debug, Clone)]
pub struct DecodedNode {
    pub name: String,
    /// Transform relative to the parent
    pub transform: Matrix4<f32>,
    pub kind: NodeKind,
    pub children: Vec<DecodedNode>,
}

impl DecodedNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Arc<MeshGeometry>, material: Material) -> Self {
        Self {
            kind: NodeKind::Mesh(MeshNode { geometry, material }),
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: DecodedNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DecodedNode>) -> Self {
        self.children.extend(children);
        self
    }
}

/// The top-level nodes of a decoded document, in document order
#[derive(Debug, Clone, Default)]
pub struct DecodedScene {
    pub roots: Vec<DecodedNode>,
}

impl DecodedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, node: DecodedNode) -> Self {
        self.roots.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in all subtrees
    pub fn node_count(&self) -> usize {
        fn count(node: &DecodedNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}

/// Identifies one load request. Generations increase monotonically per viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    /// Binary glTF container
    Glb,
    /// glTF JSON document
    Gltf,
    /// Wavefront OBJ text
    Obj,
}

impl SceneFormat {
    /// Detects the format from the first bytes of a document
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(GLB_MAGIC) {
            return Some(Self::Glb);
        }
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
        if *first == b'{' {
            Some(Self::Gltf)
        } else {
            None
        }
    }

    /// Maps a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "glb" => Some(Self::Glb),
            "gltf" => Some(Self::Gltf),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    /// Uses the extension of a path or URL, ignoring any query string
    pub fn from_name(name: &str) -> Option<Self> {
        let path = name.split(['?', '#']).next().unwrap_or(name);
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Narrow decoding contract: bytes in, scene description out
pub trait SceneDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedScene, DecodeError>;
}

/// Decodes a document, detecting its format.
///
/// Content signatures win over `name_hint` (a file name or URL); text that is
/// neither JSON nor named otherwise is read as OBJ.
///
/// # Arguments
///
/// * `bytes` - The complete document
/// * `name_hint` - Optional file name or URL used for its extension
pub fn decode(bytes: &[u8], name_hint: Option<&str>) -> Result<DecodedScene, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    let format = SceneFormat::sniff(bytes)
        .or_else(|| name_hint.and_then(SceneFormat::from_name))
        .or_else(|| std::str::from_utf8(bytes).ok().map(|_| SceneFormat::Obj))
        .ok_or(DecodeError::UnrecognizedFormat)?;

    log::debug!("decoding {} bytes as {:?}", bytes.len(), format);
    let scene = match format {
        SceneFormat::Glb | SceneFormat::Gltf => GltfDecoder.decode(bytes)?,
        SceneFormat::Obj => ObjDecoder.decode(bytes)?,
    };
    log::info!(
        "decoded {:?} document with {} nodes",
        format,
        scene.node_count()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(SceneFormat::sniff(b"glTF\x02\0\0\0"), Some(SceneFormat::Glb));
        assert_eq!(SceneFormat::sniff(b"  \n{\"asset\":{}}"), Some(SceneFormat::Gltf));
        assert_eq!(SceneFormat::sniff(b"v 0 0 0"), None);

        assert_eq!(SceneFormat::from_name("Body.GLB"), Some(SceneFormat::Glb));
        assert_eq!(
            SceneFormat::from_name("https://host/a/model.obj?token=1"),
            Some(SceneFormat::Obj)
        );
        assert_eq!(SceneFormat::from_name("notes.txt"), None);
    }

    #[test]
    fn test_empty_and_binary_garbage_fail() {
        assert!(matches!(decode(b"", None), Err(DecodeError::Empty)));
        assert!(matches!(decode(b" \n\t", None), Err(DecodeError::Empty)));
        assert!(matches!(
            decode(&[0xff, 0xfe, 0x00, 0x81], None),
            Err(DecodeError::UnrecognizedFormat)
        ));
    }

    #[test]
    fn test_decoded_node_count() {
        let scene = DecodedScene::new()
            .with_root(DecodedNode::group("a").with_children([
                DecodedNode::group("b"),
                DecodedNode::group("c").with_child(DecodedNode::group("d")),
            ]))
            .with_root(DecodedNode::group("e"));
        assert_eq!(scene.node_count(), 5);
    }
}
