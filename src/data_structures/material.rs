//! Surface materials.
//!
//! A [`Material`] is a plain value: three colours, a shininess exponent and
//! up to four texture slots. Meshes carry a default material, instances may
//! override it, and [`Material::DEFAULT`] covers everything else.

use cgmath::Vector3;

use crate::data_structures::{geometry::GeometryMaterial, texture::TextureId};

/// Stable index of a material in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

/// Fixed texture units, one per material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    Ambient = 0,
    Diffuse = 1,
    Specular = 2,
    Normal = 3,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Ambient,
        TextureSlot::Diffuse,
        TextureSlot::Specular,
        TextureSlot::Normal,
    ];

    pub fn unit(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// Indexed by [`TextureSlot`].
    pub textures: [Option<TextureId>; 4],
}

impl Material {
    pub const DEFAULT: Material = Material {
        ambient: [0.5, 0.5, 0.5],
        diffuse: [0.5, 0.5, 0.5],
        specular: [0.5, 0.5, 0.5],
        shininess: 1.0,
        textures: [None; 4],
    };

    /// Ambient and diffuse set to `color`.
    pub fn from_color(color: Vector3<f32>) -> Self {
        Self {
            ambient: color.into(),
            diffuse: color.into(),
            ..Self::DEFAULT
        }
    }

    /// Ambient and diffuse maps set to `texture`.
    pub fn from_texture(texture: TextureId) -> Self {
        Self::DEFAULT
            .with_texture(TextureSlot::Ambient, texture)
            .with_texture(TextureSlot::Diffuse, texture)
    }

    pub fn textured(color: Vector3<f32>, texture: TextureId) -> Self {
        Self::from_color(color)
            .with_texture(TextureSlot::Ambient, texture)
            .with_texture(TextureSlot::Diffuse, texture)
    }

    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureId) -> Self {
        self.textures[slot as usize] = Some(texture);
        self
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<TextureId> {
        self.textures[slot as usize]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&GeometryMaterial> for Material {
    fn from(m: &GeometryMaterial) -> Self {
        Self {
            ambient: m.ambient,
            diffuse: m.diffuse,
            specular: m.specular,
            shininess: m.shininess,
            textures: [None; 4],
        }
    }
}
