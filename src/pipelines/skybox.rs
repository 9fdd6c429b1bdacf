//! Background cube drawn without depth testing.

use cgmath::Matrix4;

use crate::{
    camera::Camera,
    data_structures::{material::TextureSlot, scene::Scene, texture::TextureKind},
    error::{LoadError, RenderError},
    pipelines::{
        basic::DepthMode,
        program::{GpuProgram, ProgramLayout},
        uniforms::InstanceUniform,
    },
    render::{DrawCommand, DrawList, ProgramKind, RenderContext},
    resources::shader::ProgramLoader,
};

/// Share of the camera translation the skybox follows.
pub const SKYBOX_PARALLAX: f32 = 0.01;

const LAYOUT: ProgramLayout = ProgramLayout {
    kind: ProgramKind::Skybox,
    lighting: false,
    texture_units: 1,
    texture_kind: TextureKind::Cube,
    depth: DepthMode::Ignore,
    cull_mode: None,
};

/// View matrix with its translation scaled down so the sky barely moves.
pub fn damped_view(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut damped = view;
    damped.w.x *= SKYBOX_PARALLAX;
    damped.w.y *= SKYBOX_PARALLAX;
    damped.w.z *= SKYBOX_PARALLAX;
    damped
}

#[derive(Debug, Default)]
pub struct SkyboxRenderer {
    program: Option<GpuProgram>,
}

impl SkyboxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some()
    }

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
        let (vertex, fragment) = LAYOUT.kind.sources();
        let shaders =
            loader.load_program(device, &context.asset(vertex), &context.asset(fragment))?;
        self.program = Some(GpuProgram::new(device, queue, color_format, &shaders, LAYOUT));
        Ok(())
    }

    /// Empty when the scene has no skybox.
    pub fn record(&self, scene: &Scene, camera: &Camera, context: &RenderContext) -> DrawList {
        let mut list = DrawList::new();
        let Some(skybox) = scene.skybox() else {
            return list;
        };

        let view = damped_view(camera.view_matrix());
        let projection =
            camera.projection_matrix(context.view_width as f32, context.view_height as f32);
        let mut uniforms = InstanceUniform::new(view * skybox.transform.to_matrix(), projection);

        list.push(DrawCommand::UseProgram(ProgramKind::Skybox));
        list.push(DrawCommand::BindScene);
        if let Some(texture) = scene
            .material_of_instance(skybox)
            .texture(TextureSlot::Diffuse)
            .filter(|&texture| scene.texture(texture).kind() == TextureKind::Cube)
        {
            list.push(DrawCommand::BindTexture { unit: 0, texture });
            uniforms.use_texture(TextureSlot::Ambient);
        }
        list.push(DrawCommand::Draw {
            mesh: skybox.mesh,
            uniforms,
        });
        list.push(DrawCommand::UnbindScene);
        list
    }

    /// Does nothing, GPU included, when the scene has no skybox.
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
        if list.is_empty() {
            return Ok(());
        }
        let program = self.program.as_mut().ok_or(RenderError::NotInitialized)?;
        program.prepare(device, queue, scene, &list)?;
        program.encode(scene, &list, pass)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, SquareMatrix, vec3};

    use super::*;

    #[test]
    fn damping_scales_translation_only() {
        let view = Matrix4::from_translation(vec3(100.0, -50.0, 20.0))
            * Matrix4::from_angle_y(cgmath::Deg(30.0));
        let damped = damped_view(view);
        assert_eq!(damped.x, view.x);
        assert_eq!(damped.y, view.y);
        assert_eq!(damped.z, view.z);
        let offset = damped.w.truncate() - vec3(1.0, -0.5, 0.2);
        assert!(offset.magnitude() < 1e-5);
        assert_eq!(damped.w.w, 1.0);
    }

    #[test]
    fn identity_is_unchanged() {
        assert_eq!(damped_view(Matrix4::identity()), Matrix4::identity());
    }
}
