//! Geometry blobs handed to the scene registry.
//!
//! A [`Geometry`] is what a loader produces: sub-mesh index ranges, one
//! vertex array they all index into, a flat index array and the materials
//! referenced by the sub-meshes. The registry copies everything it needs.

use std::f32::consts::PI;

/// Vertex layout shared by every mesh in a scene.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Index range of one sub-mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub index_offset: u32,
    pub index_count: u32,
    /// Index into [`Geometry::materials`].
    pub material: Option<usize>,
}

/// Colours of a loaded material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMaterial {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub meshes: Vec<SubMesh>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub materials: Vec<GeometryMaterial>,
}

impl Geometry {
    /// Unit sphere, counter-clockwise seen from outside. `stacks` run pole to
    /// pole, `slices` around the Y axis.
    pub fn uv_sphere(stacks: u32, slices: u32) -> Self {
        let stacks = stacks.max(2);
        let slices = slices.max(3);

        let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
        for i in 0..=stacks {
            let phi = PI * i as f32 / stacks as f32;
            for j in 0..=slices {
                let theta = 2.0 * PI * j as f32 / slices as f32;
                let normal = [phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos()];
                vertices.push(Vertex {
                    position: normal,
                    normal,
                    tex_coords: [j as f32 / slices as f32, i as f32 / stacks as f32],
                });
            }
        }

        let row = slices + 1;
        let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * row + j;
                let b = a + row;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::single(vertices, indices)
    }

    /// Cube spanning -1..1 on every axis, faces pointing outwards.
    pub fn cube() -> Self {
        // (normal, u axis, v axis) per face
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = std::array::from_fn(|k| normal[k] + su * u[k] + sv * v[k]);
                vertices.push(Vertex {
                    position,
                    normal,
                    tex_coords: [(su + 1.0) / 2.0, (sv + 1.0) / 2.0],
                });
            }
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }

        Self::single(vertices, indices)
    }

    fn single(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            meshes: vec![SubMesh {
                index_offset: 0,
                index_count: indices.len() as u32,
                material: None,
            }],
            vertices,
            indices,
            materials: Vec::new(),
        }
    }
}
