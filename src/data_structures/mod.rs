//! Scene data: geometry, meshes, materials, textures and instances.
//!
//! - `geometry` is CPU-side vertex data as produced by loaders and generators
//! - `mesh` names an index range in the scene's shared buffers
//! - `material` holds surface colours and texture slots
//! - `texture` wraps decoded images until they become GPU textures
//! - `instance` places a mesh in the world
//! - `scene` is the registry that owns all of the above

pub mod geometry;
pub mod instance;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;
