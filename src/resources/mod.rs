//! Loaders for everything the scene reads from disk.
//!
//! Each concern sits behind a narrow trait so the scene and the renderers
//! never touch file formats directly:
//!
//! - [`GeometryLoader`]: meshes, vertices, indices and materials ([`ObjLoader`])
//! - [`ImageLoader`]: decoded RGBA pixels ([`FsImageLoader`])
//! - [`ProgramLoader`]: a vertex/fragment shader pair ([`WgslLoader`])

pub mod mesh;
pub mod shader;
pub mod texture;

pub use mesh::{GeometryLoader, ObjLoader};
pub use shader::{ProgramLoader, ShaderPair, WgslLoader};
pub use texture::{FsImageLoader, ImageLoader};
