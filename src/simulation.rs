//! Simulation state advanced once per frame.
//!
//! [`Simulation`] ties a [`SolarSystem`] to the scene instances that show its
//! bodies. It owns the simulated clock and the camera set, reacts to input and
//! rewrites every tracked instance's transform on each update.
//!
//! # Controls
//!
//! - `Escape` or closing the window stops the loop
//! - `P` pauses and resumes time
//! - `Right` / `Left` held: time runs 3x faster, forwards or backwards
//! - `Up` / `Down`: step time by one step
//! - `Tab`: next camera
//! - `W` `A` `S` `D`, mouse wheel: steer the active camera
//! - `Space`: next body, when the tracking camera is active

use std::f32::consts::PI;

use winit::keyboard::KeyCode;

use crate::{
    camera::{Camera, Lens, OrbitalCamera, TargetCamera, TrackedBody},
    config::SimulationConfig,
    data_structures::{
        material::Material,
        mesh::MeshId,
        scene::Scene,
    },
    error::SceneError,
    input::{InputEvent, KeyState},
    orbit::{ElementKind, SolarSystem},
    resources::texture::ImageLoader,
};

/// Below this speed time counts as paused.
const PAUSED: f32 = 0.01;
const FAST_FORWARD: f32 = 3.0;

#[derive(Debug)]
pub struct Simulation {
    system: SolarSystem,
    bodies: Vec<TrackedBody>,
    cameras: Vec<Camera>,
    current_camera: usize,
    /// Simulated days since start.
    pub time: f32,
    /// Simulated days per second.
    pub time_speed: f32,
    last_time_speed: f32,
    time_step: f32,
    size_scale: f32,
    distance_scale: f32,
    frame: u64,
    done: bool,
}

impl Simulation {
    /// Adds one textured instance per element of `system`, parents before
    /// children, and lights the scene from the root star.
    pub fn populate(
        scene: &mut Scene,
        system: SolarSystem,
        sphere: MeshId,
        loader: &dyn ImageLoader,
        config: &SimulationConfig,
    ) -> Result<Self, SceneError> {
        let mut bodies = Vec::with_capacity(system.len());
        for element in system.walk() {
            let body = system.get(element);
            let texture = scene.add_texture(loader, body.texture())?;
            let instance = scene.make_instance(sphere);
            let material = scene.add_material(Material::textured(body.color(), texture));
            scene.instance_mut(instance).material = Some(material);
            bodies.push(TrackedBody { instance, element });
        }

        let root = system.root();
        if let ElementKind::Star {
            light_color,
            light_power,
        } = system.get(root).kind()
        {
            scene.lights.directional.power = 0.1;
            scene.lights.directional.color = cgmath::vec3(1.0, 1.0, 1.0);
            scene.lights.point.position = system.position(root, 0.0);
            scene.lights.point.color = *light_color;
            scene.lights.point.power = *light_power;
        }

        let cameras = Self::cameras(&system, &bodies);
        let mut simulation = Self {
            system,
            bodies,
            cameras,
            current_camera: 0,
            time: 0.0,
            time_speed: config.time_speed,
            last_time_speed: config.time_speed,
            time_step: config.time_step,
            size_scale: config.size_scale,
            distance_scale: config.distance_scale,
            frame: 0,
            done: false,
        };
        simulation.place_bodies(scene);
        log::info!(
            "Simulation populated with {} bodies and {} cameras",
            simulation.bodies.len(),
            simulation.cameras.len()
        );
        Ok(simulation)
    }

    /// Overview from above, overview from the ecliptic, then body tracking.
    fn cameras(system: &SolarSystem, bodies: &[TrackedBody]) -> Vec<Camera> {
        let lens = Lens {
            near: 1.0,
            far: 20000.0,
            ..Lens::default()
        };
        let overview = OrbitalCamera {
            lens,
            distance: 55.0,
            translation_acceleration: (lens.far - lens.near) / 150.0,
            ..OrbitalCamera::default()
        };
        let mut cameras = vec![
            Camera::Orbital(OrbitalCamera {
                pitch: -3.0 * PI / 8.0,
                rotation_acceleration: 0.0,
                ..overview.clone()
            }),
            Camera::Orbital(OrbitalCamera {
                pitch: -PI / 16.0,
                ..overview
            }),
        ];

        let tracking = OrbitalCamera {
            lens: Lens {
                near: 0.5,
                far: 1000.0,
                ..Lens::default()
            },
            distance: 20.0,
            pitch: 2.0 * PI / 8.0,
            translation_acceleration: (1000.0 - 0.5) / 200.0,
            ..OrbitalCamera::default()
        };
        // The star itself is not worth tracking.
        let targets = bodies.iter().skip(1).copied().collect();
        if let Some(target) = TargetCamera::new(tracking, targets, system) {
            cameras.push(Camera::Target(target));
        }
        cameras
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn bodies(&self) -> &[TrackedBody] {
        &self.bodies
    }

    pub fn camera(&self) -> &Camera {
        &self.cameras[self.current_camera]
    }

    pub fn current_camera(&self) -> usize {
        self.current_camera
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Set once a quit was requested.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn handle_event(&mut self, event: &InputEvent, keys: &KeyState) {
        match *event {
            InputEvent::Quit | InputEvent::KeyUp(KeyCode::Escape) => self.done = true,
            InputEvent::KeyUp(KeyCode::KeyP) => {
                if self.time_speed.abs() > PAUSED {
                    self.last_time_speed = self.time_speed;
                    self.time_speed = 0.0;
                } else {
                    self.time_speed = self.last_time_speed;
                }
            }
            InputEvent::KeyUp(KeyCode::ArrowRight | KeyCode::ArrowLeft) => {
                self.time_speed = self.last_time_speed;
            }
            InputEvent::KeyUp(KeyCode::ArrowUp) => self.time += self.time_step,
            InputEvent::KeyUp(KeyCode::ArrowDown) => self.time -= self.time_step,
            InputEvent::KeyUp(KeyCode::Tab) => {
                self.current_camera = (self.current_camera + 1) % self.cameras.len();
                log::debug!("Switched to camera {}", self.current_camera);
            }
            InputEvent::KeyDown(KeyCode::ArrowRight) => self.accelerate(FAST_FORWARD),
            InputEvent::KeyDown(KeyCode::ArrowLeft) => self.accelerate(-FAST_FORWARD),
            _ => {}
        }
        self.cameras[self.current_camera].handle_event(event, keys, &self.system);
    }

    fn accelerate(&mut self, factor: f32) {
        if self.time_speed.abs() < PAUSED {
            self.time_speed = self.last_time_speed;
        }
        self.last_time_speed = self.time_speed;
        self.time_speed *= factor;
    }

    /// Advances the active camera and the clock by `dt` seconds and moves
    /// every body to where it is at the current time.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        log::trace!("Frame {} delta time {}", self.frame, dt);
        self.cameras[self.current_camera].update(dt, scene);
        self.place_bodies(scene);
        self.time += dt * self.time_speed;
        self.frame += 1;
    }

    fn place_bodies(&self, scene: &mut Scene) {
        for body in &self.bodies {
            let transform = &mut scene.instance_mut(body.instance).transform;
            transform.position = self.system.position(body.element, self.time) * self.distance_scale;
            transform.scale = self.system.size(body.element) * self.size_scale;
            transform.rotation = self.system.rotation(body.element, self.time);
        }
    }
}
