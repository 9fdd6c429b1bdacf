//! Cameras: a fixed lens, a free orbital camera and a body-tracking camera.
//!
//! Orbital cameras are driven by rates rather than positions: keys set an
//! angular rate, the wheel nudges a radial rate, and [`OrbitalCamera::update`]
//! integrates them. The radial rate decays each tick and snaps to zero once it
//! becomes negligible.
//!
//! # Key types
//!
//! - [`Lens`]: field of view and clip planes
//! - [`OrbitalCamera`]: yaw/pitch/roll around a target at some distance
//! - [`TargetCamera`]: an orbital camera that follows tracked bodies
//! - [`Camera`]: the variant the driver stores and dispatches to

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4};
use winit::keyboard::KeyCode;

use crate::{
    data_structures::{instance::InstanceId, instance::euler_yxz, scene::Scene},
    input::{InputEvent, KeyState, MouseButton},
    orbit::{ElementId, SolarSystem},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Radial rate kept per tick.
const RADIAL_DAMPING: f32 = 0.7;
/// Below this the radial rate is zeroed.
const RADIAL_REST: f32 = 0.05;

const YAW_LEFT: KeyCode = KeyCode::KeyA;
const YAW_RIGHT: KeyCode = KeyCode::KeyD;
const PITCH_UP: KeyCode = KeyCode::KeyW;
const PITCH_DOWN: KeyCode = KeyCode::KeyS;
const NEXT_TARGET: KeyCode = KeyCode::Space;

/// Perspective parameters. `fov` is vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
}

impl Lens {
    pub fn projection(&self, view_width: f32, view_height: f32) -> Matrix4<f32> {
        let aspect = view_width / view_height.max(1.0);
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fov, aspect, self.near, self.far)
    }
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov: Deg(70.0),
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Free camera circling `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalCamera {
    pub lens: Lens,
    pub target: Vector3<f32>,
    pub distance: f32,
    /// Added to the radial rate per wheel notch.
    pub translation_acceleration: f32,
    pub translation_speed: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Angular rate set while a rotation key is held.
    pub rotation_acceleration: f32,
    pub yaw_speed: f32,
    pub pitch_speed: f32,
}

impl Default for OrbitalCamera {
    fn default() -> Self {
        Self {
            lens: Lens::default(),
            target: Vector3::new(0.0, 0.0, 0.0),
            distance: 1.0,
            translation_acceleration: 0.2,
            translation_speed: 0.0,
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            roll: 0.0,
            rotation_acceleration: 0.2,
            yaw_speed: 0.0,
            pitch_speed: 0.0,
        }
    }
}

impl OrbitalCamera {
    pub fn handle_event(&mut self, event: &InputEvent, keys: &KeyState) {
        match *event {
            InputEvent::KeyDown(key) => match key {
                YAW_LEFT => self.yaw_speed = self.rotation_acceleration,
                YAW_RIGHT => self.yaw_speed = -self.rotation_acceleration,
                PITCH_UP => self.pitch_speed = self.rotation_acceleration,
                PITCH_DOWN => self.pitch_speed = -self.rotation_acceleration,
                _ => {}
            },
            InputEvent::KeyUp(key) if !keys.is_pressed(key) => match key {
                YAW_LEFT | YAW_RIGHT => self.yaw_speed = 0.0,
                PITCH_UP | PITCH_DOWN => self.pitch_speed = 0.0,
                _ => {}
            },
            InputEvent::MouseButtonDown(MouseButton::WheelDown) => {
                self.translation_speed += self.translation_acceleration;
            }
            InputEvent::MouseButtonDown(MouseButton::WheelUp) => {
                self.translation_speed -= self.translation_acceleration;
            }
            _ => {}
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pitch += self.pitch_speed * dt;
        self.yaw += self.yaw_speed * dt;
        self.distance += self.translation_speed * dt;
        self.translation_speed *= RADIAL_DAMPING;
        if self.translation_speed < RADIAL_REST {
            self.translation_speed = 0.0;
        }
    }

    fn rotation(&self) -> Matrix4<f32> {
        euler_yxz(self.yaw, self.pitch, self.roll)
    }

    pub fn eye(&self) -> Vector3<f32> {
        let direction = (self.rotation() * Vector4::unit_z()).truncate();
        self.target + direction.normalize() * self.distance
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let up = (self.rotation() * Vector4::unit_y()).truncate();
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye()),
            Point3::from_vec(self.target),
            up,
        )
    }
}

/// A body the target camera can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedBody {
    pub instance: InstanceId,
    pub element: ElementId,
}

/// Orbital camera centred on one of several tracked bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCamera {
    pub orbit: OrbitalCamera,
    targets: Vec<TrackedBody>,
    cursor: usize,
}

impl TargetCamera {
    /// Framed on the first target. `None` when there is nothing to track.
    pub fn new(
        orbit: OrbitalCamera,
        targets: Vec<TrackedBody>,
        system: &SolarSystem,
    ) -> Option<Self> {
        if targets.is_empty() {
            return None;
        }
        let mut camera = Self {
            orbit,
            targets,
            cursor: 0,
        };
        camera.frame(system);
        Some(camera)
    }

    pub fn current(&self) -> TrackedBody {
        self.targets[self.cursor]
    }

    /// Moves to the next target, wrapping after the last one.
    pub fn advance(&mut self, system: &SolarSystem) {
        self.cursor = (self.cursor + 1) % self.targets.len();
        self.frame(system);
    }

    /// Fits distance and clip planes to the current target's size.
    fn frame(&mut self, system: &SolarSystem) {
        let size = system.size(self.current().element).magnitude();
        self.orbit.lens.near = size * 0.00002;
        self.orbit.lens.far = size * 2.0;
        self.orbit.distance = size * 0.0002;
    }

    pub fn handle_event(&mut self, event: &InputEvent, keys: &KeyState, system: &SolarSystem) {
        self.orbit.handle_event(event, keys);
        if *event == InputEvent::KeyUp(NEXT_TARGET) {
            self.advance(system);
        }
    }

    pub fn update(&mut self, dt: f32, scene: &Scene) {
        self.orbit.update(dt);
        self.orbit.target = scene.instance(self.current().instance).transform.position;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Camera {
    /// Identity view; ignores input and time.
    Fixed(Lens),
    Orbital(OrbitalCamera),
    Target(TargetCamera),
}

impl Camera {
    pub fn handle_event(&mut self, event: &InputEvent, keys: &KeyState, system: &SolarSystem) {
        match self {
            Camera::Fixed(_) => {}
            Camera::Orbital(camera) => camera.handle_event(event, keys),
            Camera::Target(camera) => camera.handle_event(event, keys, system),
        }
    }

    pub fn update(&mut self, dt: f32, scene: &Scene) {
        match self {
            Camera::Fixed(_) => {}
            Camera::Orbital(camera) => camera.update(dt),
            Camera::Target(camera) => camera.update(dt, scene),
        }
    }

    pub fn lens(&self) -> &Lens {
        match self {
            Camera::Fixed(lens) => lens,
            Camera::Orbital(camera) => &camera.lens,
            Camera::Target(camera) => &camera.orbit.lens,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        match self {
            Camera::Fixed(_) => Matrix4::identity(),
            Camera::Orbital(camera) => camera.view_matrix(),
            Camera::Target(camera) => camera.orbit.view_matrix(),
        }
    }

    pub fn projection_matrix(&self, view_width: f32, view_height: f32) -> Matrix4<f32> {
        self.lens().projection(view_width, view_height)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::Fixed(Lens::default())
    }
}
