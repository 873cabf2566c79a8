//! Error types for the viewer
//!
//! Load failures (`DecodeError`, `FetchError`) are recoverable: the scene that
//! was on screen stays on screen. Teardown and render failures are logged by
//! the render loop and never stop it.

use thiserror::Error;

/// A model document could not be turned into a scene
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document is empty")]
    Empty,

    #[error("unrecognized scene format")]
    UnrecognizedFormat,

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("mesh '{mesh}' has no vertex positions")]
    MissingPositions { mesh: String },

    #[error("mesh '{mesh}' references vertex {index} but only has {count}")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        count: usize,
    },

    #[error("node {node} appears more than once in the hierarchy")]
    InvalidHierarchy { node: usize },
}

/// A model could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no URL given")]
    EmptyUrl,

    #[error("{url} answered with HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("could not reach {url}: {message}")]
    Transport { url: String, message: String },

    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("could not read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a load operation as reported to its caller
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not start load worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Detaching the render loop from its viewport failed
#[derive(Debug, Error)]
pub enum TeardownError {
    #[error("viewport observer was already detached")]
    AlreadyDetached,
}

/// A frame could not be produced
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("could not create graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("could not create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("UI error: {0}")]
    Ui(String),
}

/// Result type alias for load operations
pub type LoadResult<T> = Result<T, LoadError>;
