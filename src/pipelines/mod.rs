//! Render pipelines and the renderers that drive them.
//!
//! - `basic` builds a wgpu pipeline from a shader pair and a depth mode
//! - `uniforms` holds the uniform blocks shared with the WGSL programs
//! - `program` owns a pipeline with its bind groups and replays draw lists
//! - `renderer` draws scene instances at a chosen shading level
//! - `skybox` draws the background cube

pub mod basic;
pub mod program;
pub mod renderer;
pub mod skybox;
pub mod uniforms;

pub use renderer::{Capabilities, Renderer};
pub use skybox::SkyboxRenderer;
