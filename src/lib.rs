//! orrery
//!
//! A real-time orbital simulation of a star and its satellites. Bodies are
//! textured spheres placed every frame from closed-form elliptical orbits and
//! drawn with wgpu through a small set of layered renderers.
//!
//! High-level modules
//! - `orbit`: the body tree and its position/rotation/colour functions
//! - `data_structures`: scene registry with meshes, materials, textures, instances
//! - `camera`: fixed, orbital and body-tracking cameras
//! - `render`: frame recording into draw lists, viewport letterboxing
//! - `pipelines`: wgpu programs and the body and skybox renderers
//! - `resources`: image, geometry and shader loaders
//! - `input`: the input event stream and held-key state
//! - `simulation`: clock, time controls and body placement
//! - `context`: window surface and GPU device
//! - `flow`: the application loop
//! - `config`: RON settings
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod orbit;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod simulation;

// Re-exports commonly used types for convenience in downstream code.
pub use camera::Camera;
pub use config::AppConfig;
pub use data_structures::scene::Scene;
pub use error::{LoadError, RenderError, SceneError};
pub use orbit::SolarSystem;
pub use simulation::Simulation;
