use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use cgmath::vec3;
use image::{Rgba, RgbaImage};
use orrery::{
    data_structures::geometry::{Geometry, GeometryMaterial, SubMesh, Vertex},
    input::{InputEvent, KeyState},
    orbit::{ElementId, SatelliteSpec, SolarSystem, SolarSystemBuilder, SpaceElement},
    resources::ImageLoader,
    simulation::Simulation,
};

/// Decodes every path to a small white square, except the ones marked missing.
#[derive(Debug, Default)]
pub struct FakeImages {
    missing: HashSet<PathBuf>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.insert(path.into());
        self
    }
}

impl ImageLoader for FakeImages {
    fn load_image(&self, path: &Path) -> Option<RgbaImage> {
        if self.missing.contains(path) {
            return None;
        }
        Some(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])))
    }
}

pub struct TwoLevel {
    pub system: SolarSystem,
    pub star: ElementId,
    pub planet: ElementId,
    pub moon: ElementId,
}

pub const PLANET: SatelliteSpecValues = SatelliteSpecValues {
    diameter: 100.0,
    rotation_period: 24.0,
    inclination: 10.0,
    period: 100.0,
    perihelion: 50.0,
    aphelion: 60.0,
};

pub const MOON: SatelliteSpecValues = SatelliteSpecValues {
    diameter: 10.0,
    rotation_period: -48.0,
    inclination: 5.0,
    period: 10.0,
    perihelion: 1.0,
    aphelion: 2.0,
};

#[derive(Debug, Clone, Copy)]
pub struct SatelliteSpecValues {
    pub diameter: f32,
    pub rotation_period: f32,
    pub inclination: f32,
    pub period: f32,
    pub perihelion: f32,
    pub aphelion: f32,
}

impl SatelliteSpecValues {
    pub fn spec(&self, texture: &str) -> SatelliteSpec {
        SatelliteSpec {
            texture: PathBuf::from(texture),
            diameter: self.diameter,
            rotation_period: self.rotation_period,
            inclination: self.inclination,
            period: self.period,
            perihelion: self.perihelion,
            aphelion: self.aphelion,
        }
    }
}

/// Star -> planet -> moon.
pub fn two_level_system() -> TwoLevel {
    let star = SpaceElement::star(
        "star",
        "star.png",
        1000.0,
        600.0,
        vec3(1.0, 0.5, 0.25),
        100.0,
    );
    let mut builder = SolarSystemBuilder::new(star);
    let star = builder.root();
    let planet = builder
        .add_satellite(star, "planet", PLANET.spec("planet.png"))
        .unwrap();
    let moon = builder
        .add_satellite(planet, "moon", MOON.spec("moon.png"))
        .unwrap();
    TwoLevel {
        system: builder.build(),
        star,
        planet,
        moon,
    }
}

/// One triangle, optionally carrying a material.
pub fn triangle(material: Option<GeometryMaterial>) -> Geometry {
    let vertex = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        tex_coords: [x, y],
    };
    Geometry {
        meshes: vec![SubMesh {
            index_offset: 0,
            index_count: 3,
            material: material.map(|_| 0),
        }],
        vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
        indices: vec![0, 1, 2],
        materials: material.into_iter().collect(),
    }
}

pub fn red_material() -> GeometryMaterial {
    GeometryMaterial {
        ambient: [1.0, 0.0, 0.0],
        diffuse: [0.8, 0.0, 0.0],
        specular: [0.1, 0.1, 0.1],
        shininess: 32.0,
    }
}

/// Mirrors what the event loop does: held keys first, then the handler.
pub fn send(simulation: &mut Simulation, keys: &mut KeyState, event: InputEvent) {
    keys.apply(&event);
    simulation.handle_event(&event, keys);
}

pub fn assert_close(a: f32, b: f32, tolerance: f32) {
    assert!(
        (a - b).abs() <= tolerance,
        "{} and {} differ by more than {}",
        a,
        b,
        tolerance
    );
}
