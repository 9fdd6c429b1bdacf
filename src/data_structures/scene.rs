//! The scene registry.
//!
//! [`Scene`] owns every mesh, material, texture and instance, plus the
//! vertices and indices shared by all meshes. Ids handed out are indices into
//! append-only arrays and stay valid for the scene's lifetime.
//!
//! Geometry and textures accumulate on the CPU until
//! [`Scene::initialize_buffers`] uploads them in one pass. That call seals the
//! registry: further meshes or textures would never reach the GPU, so adding
//! them afterwards fails with [`SceneError::Sealed`]. Instances and materials
//! only feed per-frame uniforms and can still be added.

use std::path::Path;

use cgmath::{Vector3, vec3};
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::{Geometry, Vertex},
        instance::{Instance, InstanceId, Transform},
        material::{Material, MaterialId},
        mesh::{Mesh, MeshId},
        texture::{Texture, TextureId},
    },
    error::{LoadError, RenderError, SceneError},
    resources::texture::ImageLoader,
};

/// Uniform scale of the skybox cube.
pub const SKYBOX_SCALE: f32 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vector3<f32>,
    pub power: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub power: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
    pub power: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub point: PointLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: vec3(0.2, 0.2, 0.2),
                power: 1.0,
            },
            directional: DirectionalLight {
                direction: vec3(-0.7, -0.7, 0.0),
                color: vec3(0.2, 0.3, 0.2),
                power: 1.0,
            },
            point: PointLight {
                position: vec3(1.0, 1.0, 1.0),
                color: vec3(0.2, 0.3, 0.7),
                power: 3.0,
            },
        }
    }
}

/// GPU copies of the shared vertex and index arrays.
#[derive(Debug)]
struct SceneBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    instances: Vec<Instance>,
    skybox: Option<Instance>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    sealed: bool,
    buffers: Option<SceneBuffers>,
    pub lights: Lights,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), SceneError> {
        if self.sealed {
            return Err(SceneError::Sealed);
        }
        Ok(())
    }

    /// Appends every sub-mesh of `geometry` and returns the id of the first.
    ///
    /// Indices are rebased onto the shared vertex array and each sub-mesh
    /// material becomes a new scene material.
    pub fn add_meshes(&mut self, geometry: &Geometry) -> Result<MeshId, SceneError> {
        self.ensure_open()?;
        if geometry.meshes.is_empty() {
            return Err(LoadError::EmptyGeometry.into());
        }
        let vertex_count = geometry.vertices.len();
        if let Some(&index) = geometry.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LoadError::IndexOutOfBounds {
                index,
                vertices: vertex_count,
            }
            .into());
        }

        if let Some(sub) = geometry.meshes.iter().find(|sub| {
            sub.index_offset
                .checked_add(sub.index_count)
                .is_none_or(|end| end as usize > geometry.indices.len())
        }) {
            return Err(LoadError::IndexOutOfBounds {
                index: sub.index_offset.saturating_add(sub.index_count),
                vertices: vertex_count,
            }
            .into());
        }

        let first = MeshId(self.meshes.len());
        let base = self.vertices.len() as u32;
        for sub in &geometry.meshes {
            let material = sub
                .material
                .and_then(|m| geometry.materials.get(m))
                .map(|m| self.add_material(Material::from(m)));

            self.meshes.push(Mesh {
                index_offset: self.indices.len() as u32,
                index_count: sub.index_count,
                material,
            });
            let range = sub.index_offset as usize..(sub.index_offset + sub.index_count) as usize;
            self.indices
                .extend(geometry.indices[range].iter().map(|i| base + i));
        }
        self.vertices.extend_from_slice(&geometry.vertices);

        Ok(first)
    }

    /// Places `mesh` with an identity transform and no material override.
    pub fn make_instance(&mut self, mesh: MeshId) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(Instance::new(mesh));
        id
    }

    pub fn add_texture(
        &mut self,
        loader: &dyn ImageLoader,
        path: &Path,
    ) -> Result<TextureId, SceneError> {
        self.ensure_open()?;
        let texture = Texture::load(loader, path)?;
        Ok(self.push_texture(texture))
    }

    /// Cube map from the six sky faces stored in `folder`.
    pub fn add_sky_texture(
        &mut self,
        loader: &dyn ImageLoader,
        folder: &Path,
    ) -> Result<TextureId, SceneError> {
        self.ensure_open()?;
        let texture = Texture::load_sky(loader, folder)?;
        Ok(self.push_texture(texture))
    }

    fn push_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Installs the background cube. It is kept apart from the instance list.
    pub fn set_skybox(
        &mut self,
        geometry: &Geometry,
        loader: &dyn ImageLoader,
        folder: &Path,
    ) -> Result<(), SceneError> {
        let texture = self.add_sky_texture(loader, folder)?;
        let mesh = self.add_meshes(geometry)?;
        let material = self.add_material(Material::from_texture(texture));
        self.skybox = Some(Instance {
            transform: Transform::scaled(SKYBOX_SCALE),
            mesh,
            material: Some(material),
        });
        Ok(())
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.0]
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.0]
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> &mut Instance {
        &mut self.instances[id.0]
    }

    /// Instances in insertion order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn skybox(&self) -> Option<&Instance> {
        self.skybox.as_ref()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Instance override, else the mesh default, else [`Material::DEFAULT`].
    pub fn material_of_instance(&self, instance: &Instance) -> &Material {
        if let Some(id) = instance.material {
            return self.material(id);
        }
        match self.mesh(instance.mesh).material {
            Some(id) => self.material(id),
            None => &Material::DEFAULT,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    /// Stops accepting geometry and textures. Fails when nothing was added
    /// or when already sealed.
    pub fn seal(&mut self) -> Result<(), SceneError> {
        if self.sealed {
            return Err(SceneError::AlreadyInitialized);
        }
        if self.meshes.is_empty() {
            return Err(SceneError::NoGeometry);
        }
        self.sealed = true;
        Ok(())
    }

    /// Seals the registry, then uploads vertices, indices and every texture.
    pub fn initialize_buffers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<(), SceneError> {
        self.seal()?;

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        for (i, texture) in self.textures.iter_mut().enumerate() {
            texture.upload(TextureId(i), device, queue)?;
        }
        self.buffers = Some(SceneBuffers { vertices, indices });

        log::info!(
            "Scene uploaded: {} meshes, {} vertices, {} indices, {} textures",
            self.meshes.len(),
            self.vertices.len(),
            self.indices.len(),
            self.textures.len()
        );
        Ok(())
    }

    /// Binds the shared vertex and index buffers on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<(), RenderError> {
        let buffers = self.buffers.as_ref().ok_or(RenderError::SceneNotInitialized)?;
        pass.set_vertex_buffer(0, buffers.vertices.slice(..));
        pass.set_index_buffer(buffers.indices.slice(..), wgpu::IndexFormat::Uint32);
        Ok(())
    }
}
