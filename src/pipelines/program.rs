//! A linked program: pipeline plus the uniform and texture bindings it reads.
//!
//! Bind group slots:
//!
//! - group 0: [`InstanceUniform`] array, one dynamic offset per draw
//! - group 1: [`LightUniform`] for lit programs
//! - next free group: one texture and sampler per texture unit
//!
//! Texture units keep whatever was bound last during a frame. Units never
//! bound in the current frame hold a blank texel.

use std::{collections::HashMap, num::NonZeroU64};

use crate::{
    data_structures::{
        geometry::Vertex,
        scene::Scene,
        texture::{GpuTexture, TextureId, TextureKind},
    },
    error::RenderError,
    pipelines::{
        basic::{DepthMode, mk_render_pipeline},
        uniforms::{InstanceUniform, LightUniform},
    },
    render::{DrawCommand, DrawList, ProgramKind},
    resources::shader::ShaderPair,
};

const INITIAL_DRAWS: usize = 16;

/// Shape of a program's bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    pub kind: ProgramKind,
    pub lighting: bool,
    pub texture_units: u32,
    pub texture_kind: TextureKind,
    pub depth: DepthMode,
    pub cull_mode: Option<wgpu::Face>,
}

/// Growable uniform buffer addressed with dynamic offsets.
#[derive(Debug)]
struct UniformArray {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    stride: u64,
}

impl UniformArray {
    const SIZE: u64 = std::mem::size_of::<InstanceUniform>() as u64;

    fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("instance_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(Self::SIZE),
                },
                count: None,
            }],
        });
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = wgpu::util::align_to(Self::SIZE, alignment);
        let (buffer, bind_group) = Self::allocate(device, &layout, INITIAL_DRAWS, stride);
        Self {
            layout,
            buffer,
            bind_group,
            capacity: INITIAL_DRAWS,
            stride,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("instance_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(Self::SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, uniforms: &[InstanceUniform]) {
        if uniforms.is_empty() {
            return;
        }
        if uniforms.len() > self.capacity {
            self.capacity = uniforms.len().next_power_of_two();
            (self.buffer, self.bind_group) =
                Self::allocate(device, &self.layout, self.capacity, self.stride);
        }

        let stride = self.stride as usize;
        let mut bytes = vec![0u8; uniforms.len() * stride];
        for (chunk, uniform) in bytes.chunks_mut(stride).zip(uniforms) {
            chunk[..Self::SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    fn offset(&self, draw: usize) -> wgpu::DynamicOffset {
        (draw as u64 * self.stride) as wgpu::DynamicOffset
    }
}

#[derive(Debug)]
struct FrameBinding {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FrameBinding {
    fn new(device: &wgpu::Device) -> Self {
        let size = std::mem::size_of::<LightUniform>() as u64;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(size),
                },
                count: None,
            }],
        });
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            layout,
            buffer,
            bind_group,
        }
    }
}

type UnitKey = Vec<Option<TextureId>>;

/// Texture units and the bind groups built for unit combinations seen so far.
#[derive(Debug)]
struct TextureUnits {
    group: u32,
    kind: TextureKind,
    layout: wgpu::BindGroupLayout,
    blank: GpuTexture,
    bind_groups: HashMap<UnitKey, wgpu::BindGroup>,
    /// Unit state at each draw of the prepared frame.
    frame: Vec<UnitKey>,
}

impl TextureUnits {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        group: u32,
        units: u32,
        kind: TextureKind,
    ) -> Self {
        let entries: Vec<_> = (0..units)
            .flat_map(|unit| {
                [
                    wgpu::BindGroupLayoutEntry {
                        binding: unit * 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: kind.view_dimension(),
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: unit * 2 + 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ]
            })
            .collect();
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &entries,
        });
        Self {
            group,
            kind,
            layout,
            blank: GpuTexture::create_blank(device, queue, kind),
            bind_groups: HashMap::new(),
            frame: Vec::new(),
        }
    }

    fn bind(
        &self,
        units: &mut UnitKey,
        unit: u32,
        texture: TextureId,
        scene: &Scene,
    ) -> Result<(), RenderError> {
        let entry = scene.texture(texture);
        if entry.kind() != self.kind {
            log::warn!(
                "{:?} is a {:?} texture, unit {} expects {:?}; left unbound",
                texture,
                entry.kind(),
                unit,
                self.kind
            );
            return Ok(());
        }
        if !entry.is_resident() {
            return Err(RenderError::TextureNotResident(texture));
        }
        match units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(texture),
            None => log::warn!("Texture unit {} does not exist; {:?} ignored", unit, texture),
        }
        Ok(())
    }

    fn ensure_bind_group(&mut self, device: &wgpu::Device, scene: &Scene, key: &UnitKey) {
        if self.bind_groups.contains_key(key) {
            return;
        }
        let textures: Vec<&GpuTexture> = key
            .iter()
            .map(|slot| slot.and_then(|id| scene.texture(id).gpu()).unwrap_or(&self.blank))
            .collect();
        let entries: Vec<_> = textures
            .iter()
            .enumerate()
            .flat_map(|(unit, texture)| {
                [
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ]
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout: &self.layout,
            entries: &entries,
        });
        self.bind_groups.insert(key.clone(), bind_group);
    }
}

#[derive(Debug)]
pub struct GpuProgram {
    layout: ProgramLayout,
    pipeline: wgpu::RenderPipeline,
    instances: UniformArray,
    frame: Option<FrameBinding>,
    textures: Option<TextureUnits>,
}

impl GpuProgram {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        shaders: &ShaderPair,
        layout: ProgramLayout,
    ) -> Self {
        let instances = UniformArray::new(device);
        let frame = layout.lighting.then(|| FrameBinding::new(device));
        let textures = (layout.texture_units > 0).then(|| {
            let group = if frame.is_some() { 2 } else { 1 };
            TextureUnits::new(device, queue, group, layout.texture_units, layout.texture_kind)
        });

        let mut bind_group_layouts = vec![&instances.layout];
        if let Some(frame) = &frame {
            bind_group_layouts.push(&frame.layout);
        }
        if let Some(textures) = &textures {
            bind_group_layouts.push(&textures.layout);
        }
        let label = format!("{:?} Pipeline", layout.kind);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });
        let pipeline = mk_render_pipeline(
            device,
            &label,
            &pipeline_layout,
            color_format,
            &[Vertex::desc()],
            shaders,
            layout.depth,
            layout.cull_mode,
        );

        Self {
            layout,
            pipeline,
            instances,
            frame,
            textures,
        }
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    /// Uploads the uniforms of `list` and builds the texture bind groups it needs.
    pub(crate) fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        list: &DrawList,
    ) -> Result<(), RenderError> {
        let unit_count = self.layout.texture_units as usize;
        let mut units: UnitKey = vec![None; unit_count];
        let mut uniforms = Vec::new();
        if let Some(textures) = &mut self.textures {
            textures.frame.clear();
        }

        for command in list.commands() {
            match command {
                DrawCommand::FrameUniforms(light) => {
                    if let Some(frame) = &self.frame {
                        queue.write_buffer(&frame.buffer, 0, bytemuck::bytes_of(light));
                    }
                }
                DrawCommand::BindTexture { unit, texture } => {
                    if let Some(textures) = &self.textures {
                        textures.bind(&mut units, *unit, *texture, scene)?;
                    }
                }
                DrawCommand::Draw { uniforms: uniform, .. } => {
                    uniforms.push(*uniform);
                    if let Some(textures) = &mut self.textures {
                        textures.ensure_bind_group(device, scene, &units);
                        textures.frame.push(units.clone());
                    }
                }
                DrawCommand::UseProgram(_) | DrawCommand::BindScene | DrawCommand::UnbindScene => {}
            }
        }

        self.instances.write(device, queue, &uniforms);
        Ok(())
    }

    /// Replays a prepared `list` onto `pass`.
    pub(crate) fn encode(
        &self,
        scene: &Scene,
        list: &DrawList,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> Result<(), RenderError> {
        let mut bound = false;
        let mut draw = 0;
        for command in list.commands() {
            match command {
                DrawCommand::UseProgram(_) => pass.set_pipeline(&self.pipeline),
                DrawCommand::BindScene => {
                    scene.bind(pass)?;
                    bound = true;
                }
                DrawCommand::UnbindScene => bound = false,
                DrawCommand::FrameUniforms(_) => {
                    if let Some(frame) = &self.frame {
                        pass.set_bind_group(1, &frame.bind_group, &[]);
                    }
                }
                DrawCommand::BindTexture { .. } => {}
                DrawCommand::Draw { mesh, .. } => {
                    if !bound {
                        return Err(RenderError::SceneNotBound);
                    }
                    pass.set_bind_group(0, &self.instances.bind_group, &[self.instances.offset(draw)]);
                    if let Some(textures) = &self.textures {
                        let bind_group = textures
                            .frame
                            .get(draw)
                            .and_then(|key| textures.bind_groups.get(key))
                            .ok_or(RenderError::NotInitialized)?;
                        pass.set_bind_group(textures.group, bind_group, &[]);
                    }
                    scene.mesh(*mesh).draw(pass);
                    draw += 1;
                }
            }
        }
        Ok(())
    }
}
