//! Error types shared across the crate.
//!
//! Asset and scene errors are fatal for the caller: nothing here is retried.
//! Lookups that can legitimately miss (a satellite by name, a camera target)
//! return `Option` instead of an error.

use std::path::PathBuf;

use crate::data_structures::texture::TextureId;

/// Failure to turn an external asset into scene data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no image could be decoded from {path}")]
    Image { path: PathBuf },

    #[error("sky face `{face}` is missing from {folder}")]
    MissingFace { folder: PathBuf, face: &'static str },

    #[error("sky face `{face}` is {found:?} but the first face is {expected:?}")]
    FaceSize {
        face: &'static str,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse geometry {path}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("geometry contains no meshes")]
    EmptyGeometry,

    #[error("index {index} points past the {vertices} vertices of its geometry")]
    IndexOutOfBounds { index: u32, vertices: usize },

    #[error("shader source {path} is empty")]
    EmptyShader { path: PathBuf },
}

/// Misuse of the scene registry lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("there isn't any mesh in the scene")]
    NoGeometry,

    #[error("scene buffers are already initialized")]
    AlreadyInitialized,

    #[error("scene is sealed, GPU buffers would not reflect this change")]
    Sealed,

    #[error("texture {0:?} is already resident on the GPU")]
    AlreadyUploaded(TextureId),
}

/// Failure while turning a draw list into GPU commands.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer used before initialize()")]
    NotInitialized,

    #[error("scene buffers are not initialized")]
    SceneNotInitialized,

    #[error("draw issued while the scene is unbound")]
    SceneNotBound,

    #[error("texture {0:?} is not resident on the GPU")]
    TextureNotResident(TextureId),
}
