use std::sync::Arc;

use winit::window::Window;

use crate::{data_structures::texture::GpuTexture, render::Viewport};

/// Failures while bringing up the window surface and GPU.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Window, surface and device state shared by every renderer.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: GpuTexture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Letterboxed area everything is drawn into.
    pub viewport: Viewport,
    aspect_ratio: f32,
}

impl Context {
    pub async fn new(window: Arc<Window>, aspect_ratio: f32) -> Result<Self, ContextError> {
        let size = window.inner_size();

        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| ContextError::NoAdapter)?;
        let info = adapter.get_info();
        log::info!("Selected GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders write linear colour and rely on an sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            GpuTexture::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let viewport = Viewport::letterbox(config.width, config.height, aspect_ratio);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            viewport,
            aspect_ratio,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigures the surface, depth buffer and viewport. Zero sizes are
    /// ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            GpuTexture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.viewport = Viewport::letterbox(width, height, self.aspect_ratio);
        log::debug!("Resized to {}x{}, viewport {:?}", width, height, self.viewport);
    }

    /// Next frame to draw into. Lost or outdated surfaces are reconfigured
    /// and `None` is returned so the frame is skipped.
    pub fn next_frame(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface timed out, skipping frame");
                None
            }
            Err(e) => {
                log::error!("Surface error: {}", e);
                None
            }
        }
    }
}
