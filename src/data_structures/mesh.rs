use crate::data_structures::material::MaterialId;

/// Stable index of a mesh in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) usize);

/// A contiguous run of the scene's shared index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub material: Option<MaterialId>,
}

impl Mesh {
    pub fn indices(&self) -> std::ops::Range<u32> {
        self.index_offset..self.index_offset + self.index_count
    }

    /// Expects the scene's buffers to be bound on `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.draw_indexed(self.indices(), 0, 0..1);
    }
}
