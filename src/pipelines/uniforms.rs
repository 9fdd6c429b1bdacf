//! Uniform blocks shared with the WGSL programs.
//!
//! Layouts follow WGSL uniform rules: every `vec3` is followed by a scalar or
//! padding so the next member starts on a 16 byte boundary.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::data_structures::{
    material::{Material, TextureSlot},
    scene::Lights,
};

/// Per-draw block: matrices, then material, then texture switches.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniform {
    pub mvp: [[f32; 4]; 4],
    pub mv: [[f32; 4]; 4],
    /// Inverse transpose of `mv`.
    pub normal: [[f32; 4]; 4],
    pub ambient: [f32; 3],
    pub _padding: u32,
    pub diffuse: [f32; 3],
    pub _padding2: u32,
    pub specular: [f32; 3],
    pub shininess: f32,
    /// Non-zero where the matching [`TextureSlot`] is bound.
    pub use_textures: [u32; 4],
}

impl InstanceUniform {
    pub fn new(model_view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        // Degenerate transforms (zero scale) have no normal matrix.
        let normal = model_view
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            mvp: (projection * model_view).into(),
            mv: model_view.into(),
            normal: normal.into(),
            ..<Self as bytemuck::Zeroable>::zeroed()
        }
    }

    pub fn set_material(&mut self, material: &Material) {
        self.ambient = material.ambient;
        self.diffuse = material.diffuse;
        self.specular = material.specular;
        self.shininess = material.shininess;
    }

    pub fn use_texture(&mut self, slot: TextureSlot) {
        self.use_textures[slot as usize] = 1;
    }
}

/// Per-frame block of the lit programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub view: [[f32; 4]; 4],
    pub directional_direction: [f32; 3],
    pub directional_power: f32,
    pub directional_color: [f32; 3],
    pub _padding: u32,
    pub point_position: [f32; 3],
    pub point_power: f32,
    pub point_color: [f32; 3],
    pub _padding2: u32,
    pub ambient_color: [f32; 3],
    pub ambient_power: f32,
}

impl LightUniform {
    pub fn new(view: Matrix4<f32>, lights: &Lights) -> Self {
        Self {
            view: view.into(),
            directional_direction: lights.directional.direction.into(),
            directional_power: lights.directional.power,
            directional_color: lights.directional.color.into(),
            _padding: 0,
            point_position: lights.point.position.into(),
            point_power: lights.point.power,
            point_color: lights.point.color.into(),
            _padding2: 0,
            ambient_color: lights.ambient.color.into(),
            ambient_power: lights.ambient.power,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use cgmath::{Vector4, vec3};

    use super::*;

    #[test]
    fn blocks_match_wgsl_layout() {
        assert_eq!(size_of::<InstanceUniform>(), 256);
        assert_eq!(offset_of!(InstanceUniform, ambient), 192);
        assert_eq!(offset_of!(InstanceUniform, use_textures), 240);
        assert_eq!(size_of::<LightUniform>(), 144);
        assert_eq!(offset_of!(LightUniform, ambient_color), 128);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mv = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = InstanceUniform::new(mv, Matrix4::identity());
        let normal = Matrix4::from(uniform.normal) * Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert_eq!(normal, Vector4::new(0.5, 1.0, 0.0, 0.0));
    }

    #[test]
    fn zero_scale_falls_back_to_identity_normals() {
        let mv = Matrix4::from_translation(vec3(1.0, 2.0, 3.0)) * Matrix4::from_scale(0.0);
        let uniform = InstanceUniform::new(mv, Matrix4::identity());
        assert_eq!(uniform.normal, Into::<[[f32; 4]; 4]>::into(Matrix4::<f32>::identity()));
        assert_eq!(uniform.use_textures, [0; 4]);
    }
}
