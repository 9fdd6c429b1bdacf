//! Application loop.
//!
//! [`run`] opens the window, builds the scene and drives one iteration per
//! redraw: input is dispatched as it arrives, then each redraw renders the
//! sky and the bodies, sleeps out the rest of the frame budget and advances
//! the simulation by the time the iteration really took.
//!
//! Display failures (no window, no GPU) are logged and leave the app idle so
//! it exits cleanly. Asset failures abort start-up and are returned by [`run`].

use std::{iter, sync::Arc};

use anyhow::Context as _;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window},
};

use crate::{
    config::AppConfig,
    context::Context,
    data_structures::{geometry::Geometry, scene::Scene},
    error::RenderError,
    input::{self, InputEvent, KeyState},
    orbit::SolarSystem,
    pipelines::{Renderer, SkyboxRenderer},
    render::RenderContext,
    resources::{FsImageLoader, GeometryLoader, ObjLoader, WgslLoader},
    simulation::Simulation,
};

const SPHERE_STACKS: u32 = 32;
const SPHERE_SLICES: u32 = 48;

/// Caps how often the loop runs.
#[derive(Debug)]
pub struct FramePacer {
    budget: Duration,
    mark: Instant,
}

impl FramePacer {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            mark: Instant::now(),
        }
    }

    /// Sleeps until the budget since the last call is used up, then returns
    /// the time that really passed.
    pub fn finish(&mut self) -> Duration {
        let elapsed = self.mark.elapsed();
        if elapsed < self.budget {
            std::thread::sleep(self.budget - elapsed);
        }
        let dt = self.mark.elapsed();
        self.mark = Instant::now();
        dt
    }
}

struct AppState {
    ctx: Context,
    scene: Scene,
    simulation: Simulation,
    sky: SkyboxRenderer,
    renderer: Renderer,
    render_context: RenderContext,
}

impl AppState {
    fn new(ctx: Context, config: &AppConfig) -> anyhow::Result<Self> {
        let assets = &config.assets;
        let images = FsImageLoader;
        let render_context = RenderContext {
            view_width: ctx.viewport.width as u32,
            view_height: ctx.viewport.height as u32,
            asset_root: assets.root.clone(),
        };

        let mut sky = SkyboxRenderer::new();
        sky.initialize(
            &ctx.device,
            &ctx.queue,
            ctx.color_format(),
            &render_context,
            &WgslLoader,
        )
        .context("loading skybox program")?;

        let mut scene = Scene::new();
        let cube = match &assets.skybox_mesh {
            Some(path) => ObjLoader.load_geometry(&assets.resolve(path))?,
            None => Geometry::cube(),
        };
        scene
            .set_skybox(&cube, &images, &assets.resolve(&assets.starfield))
            .context("loading skybox")?;

        let sphere = match &assets.sphere_mesh {
            Some(path) => ObjLoader.load_geometry(&assets.resolve(path))?,
            None => Geometry::uv_sphere(SPHERE_STACKS, SPHERE_SLICES),
        };
        let sphere = scene.add_meshes(&sphere)?;

        let system = SolarSystem::sol(assets.resolve(&assets.textures))?;
        let simulation =
            Simulation::populate(&mut scene, system, sphere, &images, &config.simulation)
                .context("loading bodies")?;
        scene.initialize_buffers(&ctx.device, &ctx.queue)?;

        let mut renderer = Renderer::new(config.render.mode.into());
        renderer
            .initialize(
                &ctx.device,
                &ctx.queue,
                ctx.color_format(),
                &render_context,
                &WgslLoader,
            )
            .context("loading body program")?;

        Ok(Self {
            ctx,
            scene,
            simulation,
            sky,
            renderer,
            render_context,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.render_context.view_width = self.ctx.viewport.width as u32;
        self.render_context.view_height = self.ctx.viewport.height as u32;
    }

    fn render(&mut self, clear_colour: wgpu::Color) -> Result<(), RenderError> {
        let Some(output) = self.ctx.next_frame() else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            self.ctx.viewport.apply(&mut render_pass);

            let camera = self.simulation.camera();
            self.sky.render(
                &self.ctx.device,
                &self.ctx.queue,
                &self.scene,
                camera,
                &self.render_context,
                &mut render_pass,
            )?;
            self.renderer.render(
                &self.ctx.device,
                &self.ctx.queue,
                &self.scene,
                camera,
                &self.render_context,
                &mut render_pass,
            )?;
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    config: AppConfig,
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    keys: KeyState,
    pacer: FramePacer,
    /// Fatal start-up or render error, handed back by [`run`].
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Builder::new_current_thread().build()?;
        let pacer = FramePacer::new(Duration::from_millis(config.render.frame_budget_ms));
        Ok(Self {
            config,
            async_runtime,
            state: None,
            keys: KeyState::new(),
            pacer,
            failure: None,
        })
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let window = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(window.width, window.height));
        if window.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attributes.with_resizable(true)
        }
    }

    fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = self.config.render.clear_colour;
        wgpu::Color { r, g, b, a: 1.0 }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.failure = Some(error);
        self.state = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not open a window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let ctx = match self
            .async_runtime
            .block_on(Context::new(window, self.config.window.aspect_ratio))
        {
            Ok(ctx) => ctx,
            Err(e) => {
                log::error!("Graphics unavailable: {}", e);
                event_loop.exit();
                return;
            }
        };

        match AppState::new(ctx, &self.config) {
            Ok(state) => {
                state.ctx.window().request_redraw();
                self.pacer = FramePacer::new(Duration::from_millis(
                    self.config.render.frame_budget_ms,
                ));
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let clear_colour = self.clear_colour();
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if let Some(input) = input::translate(&event, &mut self.keys) {
            if let InputEvent::Resize { width, height } = input {
                state.resize(width, height);
            }
            state.simulation.handle_event(&input, &self.keys);
        }

        if matches!(event, WindowEvent::RedrawRequested) {
            if let Err(e) = state.render(clear_colour) {
                self.fail(event_loop, e.into());
                return;
            }
            let dt = self.pacer.finish();
            state
                .simulation
                .update(dt.as_secs_f32(), &mut state.scene);

            if state.simulation.is_done() {
                log::info!("Stopped after {} frames", state.simulation.frame());
                event_loop.exit();
            } else {
                state.ctx.window().request_redraw();
            }
        }
    }
}

/// Runs until the user quits. Fails only on fatal asset or render errors.
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_waits_out_the_budget() {
        let mut pacer = FramePacer::new(Duration::from_millis(5));
        let dt = pacer.finish();
        assert!(dt >= Duration::from_millis(5));
    }

    #[test]
    fn slow_frames_are_not_delayed() {
        let mut pacer = FramePacer::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let dt = pacer.finish();
        assert!(dt >= Duration::from_millis(2));
        assert!(pacer.finish() < Duration::from_millis(2));
    }
}
