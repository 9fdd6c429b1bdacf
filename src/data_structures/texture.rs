//! Textures: CPU-side sources and their GPU-resident form.
//!
//! A [`Texture`] keeps its decoded pixels until [`Texture::upload`] moves
//! them into a [`GpuTexture`]. The move is one-way: the source is dropped and
//! a second upload is refused.
//!
//! Two kinds exist. Flat textures come from a single image; cube maps need
//! all six sky faces (`up`, `dn`, `rt`, `lf`, `ft`, `bk`) of equal size.

use std::path::Path;

use image::RgbaImage;

use crate::{
    error::{LoadError, SceneError},
    resources::texture::ImageLoader,
};

/// File stems of the six sky faces, in lookup order.
pub const SKY_FACES: [&str; 6] = ["up", "dn", "rt", "lf", "ft", "bk"];

/// Extension of sky face images.
pub const SKY_FACE_EXTENSION: &str = "tga";

/// Cube layer order on the GPU (+X, -X, +Y, -Y, +Z, -Z) as indices into
/// [`SKY_FACES`].
const CUBE_LAYERS: [usize; 6] = [2, 3, 0, 1, 4, 5];

/// Stable index of a texture in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Flat,
    Cube,
}

impl TextureKind {
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            TextureKind::Flat => wgpu::TextureViewDimension::D2,
            TextureKind::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

#[derive(Debug)]
enum State {
    Source(Vec<RgbaImage>),
    Resident(GpuTexture),
}

/// A texture registered in a scene.
#[derive(Debug)]
pub struct Texture {
    kind: TextureKind,
    state: State,
}

impl Texture {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            kind: TextureKind::Flat,
            state: State::Source(vec![image]),
        }
    }

    /// Cube map from faces given in [`SKY_FACES`] order.
    pub fn from_faces(faces: [RgbaImage; 6]) -> Result<Self, LoadError> {
        let expected = faces[0].dimensions();
        for (face, image) in SKY_FACES.iter().zip(&faces) {
            if image.dimensions() != expected {
                return Err(LoadError::FaceSize {
                    face: *face,
                    expected,
                    found: image.dimensions(),
                });
            }
        }
        Ok(Self {
            kind: TextureKind::Cube,
            state: State::Source(faces.into()),
        })
    }

    pub fn load(loader: &dyn ImageLoader, path: &Path) -> Result<Self, LoadError> {
        let image = loader.load_image(path).ok_or_else(|| LoadError::Image {
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_image(image))
    }

    /// Loads `<folder>/<face>.tga` for every sky face.
    pub fn load_sky(loader: &dyn ImageLoader, folder: &Path) -> Result<Self, LoadError> {
        let [up, dn, rt, lf, ft, bk] = SKY_FACES.map(|face| {
            let path = folder.join(face).with_extension(SKY_FACE_EXTENSION);
            loader
                .load_image(&path)
                .ok_or_else(|| LoadError::MissingFace {
                    folder: folder.to_path_buf(),
                    face,
                })
        });
        let faces = [up?, dn?, rt?, lf?, ft?, bk?];
        Self::from_faces(faces)
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn is_resident(&self) -> bool {
        matches!(self.state, State::Resident(_))
    }

    pub fn gpu(&self) -> Option<&GpuTexture> {
        match &self.state {
            State::Resident(gpu) => Some(gpu),
            State::Source(_) => None,
        }
    }

    /// Moves the pixels to the GPU and releases the source.
    pub(crate) fn upload(
        &mut self,
        id: TextureId,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<(), SceneError> {
        let State::Source(images) = &self.state else {
            return Err(SceneError::AlreadyUploaded(id));
        };
        let label = format!("texture {}", id.0);
        let gpu = match self.kind {
            TextureKind::Flat => GpuTexture::from_image(device, queue, &images[0], &label),
            TextureKind::Cube => {
                let layers = CUBE_LAYERS.map(|face| &images[face]);
                GpuTexture::from_faces(device, queue, layers, &label)
            }
        };
        self.state = State::Resident(gpu);
        Ok(())
    }
}

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A single white texel, bound to texture units nothing has claimed yet.
    pub fn create_blank(device: &wgpu::Device, queue: &wgpu::Queue, kind: TextureKind) -> Self {
        let blank = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        match kind {
            TextureKind::Flat => Self::from_image(device, queue, &blank, "blank texture"),
            TextureKind::Cube => Self::from_faces(device, queue, [&blank; 6], "blank cube"),
        }
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_layer(queue, &texture, image, 0);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Faces must already be in GPU layer order and share one size.
    pub fn from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: [&RgbaImage; 6],
        label: &str,
    ) -> Self {
        let (width, height) = faces[0].dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            write_layer(queue, &texture, face, layer as u32);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &RgbaImage, layer: u32) {
    let (width, height) = image.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_must_match() {
        let face = || RgbaImage::new(4, 4);
        let mut faces = [face(), face(), face(), face(), face(), face()];
        faces[3] = RgbaImage::new(8, 4);

        match Texture::from_faces(faces) {
            Err(LoadError::FaceSize { face, found, .. }) => {
                assert_eq!(face, "lf");
                assert_eq!(found, (8, 4));
            }
            other => panic!("expected a face size error, got {other:?}"),
        }
    }

    #[test]
    fn cube_layers_follow_gpu_axis_order() {
        let names = CUBE_LAYERS.map(|face| SKY_FACES[face]);
        assert_eq!(names, ["rt", "lf", "up", "dn", "ft", "bk"]);
    }
}
