use std::path::Path;

use cgmath::vec3;

use super::{DuplicateSatellite, SatelliteSpec, SolarSystem, SolarSystemBuilder, SpaceElement};

/// name, diameter (km), rotation (h), inclination (deg), period (days),
/// perihelion (1e6 km), aphelion (1e6 km)
type Row = (&'static str, f32, f32, f32, f32, f32, f32);

const PLANETS: [Row; 9] = [
    ("Mercury", 4879.0, 1407.6, 7.0, 88.0, 46.0, 69.8),
    ("Venus", 12104.0, -5832.5, 3.4, 224.7, 107.1, 108.9),
    ("Earth", 12756.0, 23.9, 0.0, 365.2, 147.1, 152.1),
    ("Mars", 6792.0, 24.6, 1.9, 687.0, 206.6, 249.2),
    ("Jupiter", 142984.0, 9.9, 1.3, 4331.0, 740.5, 816.6),
    ("Saturn", 120536.0, 10.7, 2.5, 10747.0, 1352.6, 1514.5),
    ("Uranus", 51118.0, -17.2, 0.8, 30589.0, 2741.3, 3003.61),
    ("Neptune", 49528.0, 16.1, 1.8, 59800.0, 4444.5, 4545.7),
    ("Pluto", 2370.0, -153.3, 17.2, 90560.0, 4436.8, 7375.9),
];

/// (planet, moon row)
const MOONS: [(&str, Row); 3] = [
    ("Earth", ("Moon", 3470.0, 655.7, 5.1, 27.3, 3.63, 4.06)),
    ("Mars", ("Phobos", 910.0, 24.0, 1.08, 0.31, 0.9, 0.9)),
    ("Mars", ("Deimos", 510.0, 24.0, 1.79, 1.26, 2.3, 2.3)),
];

const MOON_TEXTURE: &str = "moonmap.jpg";

fn spec(textures: &Path, texture: &str, row: Row) -> SatelliteSpec {
    let (_, diameter, rotation_period, inclination, period, perihelion, aphelion) = row;
    SatelliteSpec {
        texture: textures.join(texture),
        diameter,
        rotation_period,
        inclination,
        period,
        perihelion,
        aphelion,
    }
}

impl SolarSystem {
    /// Our own star system. Texture files are looked up in `textures`.
    pub fn sol(textures: impl AsRef<Path>) -> Result<SolarSystem, DuplicateSatellite> {
        let textures = textures.as_ref();
        let sun = SpaceElement::star(
            "Sun",
            textures.join("sunmap.jpg"),
            200_000.0,
            25.0 * 24.0,
            vec3(1.0, 0.7, 0.5),
            600.0,
        );

        let mut builder = SolarSystemBuilder::new(sun);
        let root = builder.root();
        let mut planets = Vec::with_capacity(PLANETS.len());
        for row in PLANETS {
            let texture = format!("{}map.jpg", row.0.to_lowercase());
            let id = builder.add_satellite(root, row.0, spec(textures, &texture, row))?;
            planets.push((row.0, id));
        }

        for (planet, row) in MOONS {
            // Every moon's planet is in the table above.
            if let Some(&(_, parent)) = planets.iter().find(|(name, _)| *name == planet) {
                builder.add_satellite(parent, row.0, spec(textures, MOON_TEXTURE, row))?;
            }
        }

        Ok(builder.build())
    }
}
