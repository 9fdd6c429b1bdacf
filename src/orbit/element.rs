use std::{
    collections::BTreeMap,
    f64::consts::PI,
    path::{Path, PathBuf},
};

use cgmath::{Vector3, vec3};

/// Perihelion and aphelion are given in millions of km.
const MILLION_KM: f64 = 1e6;

/// Star light power that maps to an unscaled colour.
const LIGHT_POWER_UNIT: f32 = 50.0;

/// Stable index of a body inside a [`SolarSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Closed-form elliptical path around a parent body.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub parent: ElementId,
    /// Degrees.
    pub inclination: f32,
    /// Days.
    pub period: f32,
    /// Millions of km.
    pub perihelion: f32,
    /// Millions of km.
    pub aphelion: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Body,
    Star {
        light_color: Vector3<f32>,
        light_power: f32,
    },
    Satellite(Orbit),
}

/// A celestial body.
#[derive(Debug, Clone)]
pub struct SpaceElement {
    name: String,
    texture: PathBuf,
    diameter: f32,
    rotation_period: f32,
    kind: ElementKind,
    children: BTreeMap<String, ElementId>,
}

impl SpaceElement {
    /// A body without light or orbit. `rotation_period` is in hours, negative
    /// for retrograde spin.
    pub fn body(
        name: impl Into<String>,
        texture: impl Into<PathBuf>,
        diameter: f32,
        rotation_period: f32,
    ) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            diameter,
            rotation_period,
            kind: ElementKind::Body,
            children: BTreeMap::new(),
        }
    }

    pub fn star(
        name: impl Into<String>,
        texture: impl Into<PathBuf>,
        diameter: f32,
        rotation_period: f32,
        light_color: Vector3<f32>,
        light_power: f32,
    ) -> Self {
        Self {
            kind: ElementKind::Star {
                light_color,
                light_power,
            },
            ..Self::body(name, texture, diameter, rotation_period)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> &Path {
        &self.texture
    }

    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    pub fn rotation_period(&self) -> f32 {
        self.rotation_period
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        match &self.kind {
            ElementKind::Satellite(orbit) => Some(orbit),
            _ => None,
        }
    }

    /// Spin about Y after `days`; Z carries a constant half turn.
    pub fn rotation(&self, days: f32) -> Vector3<f32> {
        let spin = 0.1 * days * 24.0 * 2.0 * std::f32::consts::PI / self.rotation_period;
        vec3(0.0, spin, std::f32::consts::PI)
    }

    pub fn size(&self) -> Vector3<f32> {
        vec3(self.diameter, self.diameter, self.diameter)
    }

    /// Stars glow with their light scaled by power; everything else is white.
    pub fn color(&self) -> Vector3<f32> {
        match &self.kind {
            ElementKind::Star {
                light_color,
                light_power,
            } => *light_color * (*light_power / LIGHT_POWER_UNIT),
            _ => vec3(1.0, 1.0, 1.0),
        }
    }
}

/// Parameters of a satellite before it is attached to a parent.
#[derive(Debug, Clone)]
pub struct SatelliteSpec {
    pub texture: PathBuf,
    pub diameter: f32,
    pub rotation_period: f32,
    pub inclination: f32,
    pub period: f32,
    pub perihelion: f32,
    pub aphelion: f32,
}

#[derive(Debug, thiserror::Error)]
#[error("`{parent}` already has a satellite named `{name}`")]
pub struct DuplicateSatellite {
    pub parent: String,
    pub name: String,
}

/// Appends bodies to the arena. Parents always precede their children.
#[derive(Debug)]
pub struct SolarSystemBuilder {
    elements: Vec<SpaceElement>,
}

impl SolarSystemBuilder {
    pub fn new(root: SpaceElement) -> Self {
        Self {
            elements: vec![root],
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Attaches a satellite under `parent`. Names are unique per parent.
    pub fn add_satellite(
        &mut self,
        parent: ElementId,
        name: impl Into<String>,
        spec: SatelliteSpec,
    ) -> Result<ElementId, DuplicateSatellite> {
        let name = name.into();
        let id = ElementId(self.elements.len());
        let owner = &mut self.elements[parent.0];
        if owner.children.contains_key(&name) {
            return Err(DuplicateSatellite {
                parent: owner.name.clone(),
                name,
            });
        }
        owner.children.insert(name.clone(), id);

        self.elements.push(SpaceElement {
            name,
            texture: spec.texture,
            diameter: spec.diameter,
            rotation_period: spec.rotation_period,
            kind: ElementKind::Satellite(Orbit {
                parent,
                inclination: spec.inclination,
                period: spec.period,
                perihelion: spec.perihelion,
                aphelion: spec.aphelion,
            }),
            children: BTreeMap::new(),
        });
        Ok(id)
    }

    pub fn build(self) -> SolarSystem {
        SolarSystem {
            elements: self.elements,
        }
    }
}

/// Immutable tree of bodies rooted at element 0.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    elements: Vec<SpaceElement>,
}

impl SolarSystem {
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> &SpaceElement {
        &self.elements[id.0]
    }

    /// Satellite of `parent` called `name`, if any.
    pub fn satellite(&self, parent: ElementId, name: &str) -> Option<ElementId> {
        self.elements[parent.0].children.get(name).copied()
    }

    /// Direct children of `id` in name order.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements[id.0].children.values().copied()
    }

    /// Depth-first walk from the root, children in name order.
    pub fn walk(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children: Vec<_> = self.children(id).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Position in km after `days`. The root sits at the origin.
    pub fn position(&self, id: ElementId, days: f32) -> Vector3<f32> {
        let p = self.position_f64(id, days as f64);
        vec3(p.x as f32, p.y as f32, p.z as f32)
    }

    fn position_f64(&self, id: ElementId, days: f64) -> Vector3<f64> {
        // Only satellites divide by their period; the root never does.
        let Some(orbit) = self.elements[id.0].orbit() else {
            return vec3(0.0, 0.0, 0.0);
        };

        let angle = days * 2.0 * PI / orbit.period as f64;
        let x = angle.cos() * orbit.perihelion as f64 * MILLION_KM;
        let z = angle.sin() * orbit.aphelion as f64 * MILLION_KM;

        let inclination = (orbit.inclination as f64).to_radians();
        let offset = vec3(x * inclination.cos(), x * inclination.sin(), z);

        self.position_f64(orbit.parent, days) + offset
    }

    pub fn rotation(&self, id: ElementId, days: f32) -> Vector3<f32> {
        self.get(id).rotation(days)
    }

    pub fn size(&self, id: ElementId) -> Vector3<f32> {
        self.get(id).size()
    }

    pub fn color(&self, id: ElementId) -> Vector3<f32> {
        self.get(id).color()
    }
}
