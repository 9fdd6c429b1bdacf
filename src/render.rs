//! Frame recording.
//!
//! Renderers first record what they want drawn into a [`DrawList`] and only
//! then encode it into a wgpu render pass. Recording reads the scene and the
//! camera and touches no GPU state, so the draw order, bound textures and
//! per-draw uniforms can be inspected on their own.
//!
//! # Key types
//!
//! - [`RenderContext`]: viewport size and asset root handed to renderers
//! - [`Viewport`]: the letterboxed area of the window that gets drawn
//! - [`DrawCommand`]: one step of a recorded frame
//! - [`DrawList`]: the ordered commands of one renderer for one frame

use std::path::{Path, PathBuf};

use crate::{
    data_structures::{mesh::MeshId, texture::TextureId},
    pipelines::uniforms::{InstanceUniform, LightUniform},
};

/// What renderers need to know about the frame they draw into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub view_width: u32,
    pub view_height: u32,
    pub asset_root: PathBuf,
}

impl RenderContext {
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }
}

/// A centred sub-rectangle of the window with a fixed aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Largest `ratio` rectangle that fits `width` x `height`, centred.
    pub fn letterbox(width: u32, height: u32, ratio: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let mut view_width = w;
        let mut view_height = w / ratio;
        if view_height > h {
            view_height = h;
            view_width = h * ratio;
        }
        Self {
            x: (w - view_width) / 2.0,
            y: (h - view_height) / 2.0,
            width: view_width,
            height: view_height,
        }
    }

    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(self.x, self.y, self.width, self.height, 0.0, 1.0);
    }
}

/// Shader pairs known to the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Unlit,
    Lit,
    TexturedLit,
    Skybox,
}

impl ProgramKind {
    /// Vertex and fragment sources, relative to the asset root.
    pub fn sources(self) -> (&'static str, &'static str) {
        match self {
            ProgramKind::Unlit => ("shaders/3d.vs.wgsl", "shaders/normals.fs.wgsl"),
            ProgramKind::Lit => ("shaders/light.vs.wgsl", "shaders/light.fs.wgsl"),
            ProgramKind::TexturedLit => ("shaders/light.vs.wgsl", "shaders/texture_light.fs.wgsl"),
            ProgramKind::Skybox => ("shaders/skybox.vs.wgsl", "shaders/skybox.fs.wgsl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    UseProgram(ProgramKind),
    /// Shared vertex and index buffers of the scene.
    BindScene,
    /// View matrix and lights, once per frame.
    FrameUniforms(LightUniform),
    /// Stays bound to `unit` until another texture replaces it.
    BindTexture { unit: u32, texture: TextureId },
    Draw { mesh: MeshId, uniforms: InstanceUniform },
    UnbindScene,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Draw calls in order.
    pub fn draws(&self) -> impl Iterator<Item = (MeshId, &InstanceUniform)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Draw { mesh, uniforms } => Some((*mesh, uniforms)),
            _ => None,
        })
    }

    pub fn frame_uniforms(&self) -> Option<&LightUniform> {
        self.commands.iter().find_map(|command| match command {
            DrawCommand::FrameUniforms(uniforms) => Some(uniforms),
            _ => None,
        })
    }
}
