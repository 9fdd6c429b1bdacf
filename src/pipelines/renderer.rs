//! The body renderer.
//!
//! One renderer type covers the three shading levels. Each level keeps every
//! uniform of the one below and adds its own:
//!
//! 1. unlit: model-view, normal and model-view-projection matrices
//! 2. lighting: view matrix, scene lights and the resolved material
//! 3. texturing: a flag per material slot and the matching texture unit
//!
//! # Key types
//!
//! - [`Capabilities`]: which levels are switched on
//! - [`Renderer`]: loads its program once, then records and encodes frames

use cgmath::Matrix4;

use crate::{
    camera::Camera,
    config::RenderMode,
    data_structures::{
        instance::Instance,
        material::TextureSlot,
        scene::Scene,
        texture::TextureKind,
    },
    error::{LoadError, RenderError},
    pipelines::{
        basic::DepthMode,
        program::{GpuProgram, ProgramLayout},
        uniforms::{InstanceUniform, LightUniform},
    },
    render::{DrawCommand, DrawList, ProgramKind, RenderContext},
    resources::shader::{ProgramLoader, ShaderPair},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub lighting: bool,
    /// Only meaningful together with `lighting`.
    pub texturing: bool,
}

impl Capabilities {
    pub const UNLIT: Self = Self {
        lighting: false,
        texturing: false,
    };
    pub const LIT: Self = Self {
        lighting: true,
        texturing: false,
    };
    pub const TEXTURED_LIT: Self = Self {
        lighting: true,
        texturing: true,
    };

    pub fn program(&self) -> ProgramKind {
        match (self.lighting, self.texturing) {
            (false, _) => ProgramKind::Unlit,
            (true, false) => ProgramKind::Lit,
            (true, true) => ProgramKind::TexturedLit,
        }
    }

    fn layout(&self) -> ProgramLayout {
        let kind = self.program();
        ProgramLayout {
            kind,
            lighting: self.lighting,
            texture_units: if kind == ProgramKind::TexturedLit {
                TextureSlot::ALL.len() as u32
            } else {
                0
            },
            texture_kind: TextureKind::Flat,
            depth: DepthMode::Test,
            cull_mode: None,
        }
    }
}

impl From<RenderMode> for Capabilities {
    fn from(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Unlit => Self::UNLIT,
            RenderMode::Lit => Self::LIT,
            RenderMode::TexturedLit => Self::TEXTURED_LIT,
        }
    }
}

/// Draws every scene instance in insertion order.
#[derive(Debug, Default)]
pub struct Renderer {
    capabilities: Capabilities,
    program: Option<GpuProgram>,
}

impl Renderer {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            program: None,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some()
    }

    /// Loads the shader pair, then builds the uniform bindings around it.
    /// Later calls do nothing.
    pub fn initialize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        context: &RenderContext,
        loader: &dyn ProgramLoader,
    ) -> Result<(), LoadError> {
        if self.program.is_some() {
            return Ok(());
        }
        let shaders = self.load_program(device, context, loader)?;
        self.load_uniforms(device, queue, color_format, &shaders);
        Ok(())
    }

    fn load_program(
        &self,
        device: &wgpu::Device,
        context: &RenderContext,
        loader: &dyn ProgramLoader,
    ) -> Result<ShaderPair, LoadError> {
        let (vertex, fragment) = self.capabilities.program().sources();
        loader.load_program(device, &context.asset(vertex), &context.asset(fragment))
    }

    fn load_uniforms(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        shaders: &ShaderPair,
    ) {
        let layout = self.capabilities.layout();
        log::debug!("Linking {:?} program", layout.kind);
        self.program = Some(GpuProgram::new(device, queue, color_format, shaders, layout));
    }

    /// Commands for one frame. Reads `scene` and `camera` only.
    pub fn record(&self, scene: &Scene, camera: &Camera, context: &RenderContext) -> DrawList {
        let view = camera.view_matrix();
        let projection =
            camera.projection_matrix(context.view_width as f32, context.view_height as f32);

        let mut list = DrawList::new();
        list.push(DrawCommand::UseProgram(self.capabilities.program()));
        list.push(DrawCommand::BindScene);
        if self.capabilities.lighting {
            list.push(DrawCommand::FrameUniforms(LightUniform::new(view, &scene.lights)));
        }
        for instance in scene.instances() {
            let uniforms = self.instance_uniforms(scene, instance, view, projection, &mut list);
            list.push(DrawCommand::Draw {
                mesh: instance.mesh,
                uniforms,
            });
        }
        list.push(DrawCommand::UnbindScene);
        list
    }

    /// Per-instance uniforms for the enabled levels. Texture bindings are
    /// pushed onto `list` as a side effect.
    fn instance_uniforms(
        &self,
        scene: &Scene,
        instance: &Instance,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        list: &mut DrawList,
    ) -> InstanceUniform {
        let mut uniforms = InstanceUniform::new(view * instance.transform.to_matrix(), projection);
        if !self.capabilities.lighting {
            return uniforms;
        }

        let material = scene.material_of_instance(instance);
        uniforms.set_material(material);
        if self.capabilities.texturing {
            for slot in TextureSlot::ALL {
                let Some(texture) = material.texture(slot) else {
                    continue;
                };
                let kind = scene.texture(texture).kind();
                if kind != TextureKind::Flat {
                    log::warn!(
                        "{:?} in {:?} slot is a {:?} texture; skipped",
                        texture,
                        slot,
                        kind
                    );
                    continue;
                }
                list.push(DrawCommand::BindTexture {
                    unit: slot.unit(),
                    texture,
                });
                uniforms.use_texture(slot);
            }
        }
        uniforms
    }

    /// Records and encodes one frame into `pass`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        camera: &Camera,
        context: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> Result<(), RenderError> {
        let list = self.record(scene, camera, context);
        let program = self.program.as_mut().ok_or(RenderError::NotInitialized)?;
        program.prepare(device, queue, scene, &list)?;
        program.encode(scene, &list, pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_pick_programs() {
        assert_eq!(Capabilities::UNLIT.program(), ProgramKind::Unlit);
        assert_eq!(Capabilities::LIT.program(), ProgramKind::Lit);
        assert_eq!(Capabilities::TEXTURED_LIT.program(), ProgramKind::TexturedLit);
        assert_eq!(Capabilities::from(RenderMode::Lit), Capabilities::LIT);
    }

    #[test]
    fn only_textured_programs_have_units() {
        assert_eq!(Capabilities::LIT.layout().texture_units, 0);
        assert_eq!(Capabilities::TEXTURED_LIT.layout().texture_units, 4);
        assert!(!Capabilities::UNLIT.layout().lighting);
    }

    #[test]
    fn fresh_renderer_is_not_initialized() {
        let renderer = Renderer::new(Capabilities::LIT);
        assert!(!renderer.is_initialized());
        assert_eq!(renderer.capabilities(), Capabilities::LIT);
    }
}
