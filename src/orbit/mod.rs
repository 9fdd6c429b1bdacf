//! Orbital model of a star and its satellites.
//!
//! Bodies live in an immutable arena ([`SolarSystem`]) addressed by
//! [`ElementId`]. A satellite stores the id of the body it orbits, and its
//! position is composed recursively from its parent's position at the same
//! instant. Nothing is cached: every query walks the parent chain again.
//!
//! # Key types
//!
//! - [`SpaceElement`]: one body (texture, diameter, spin, children by name)
//! - [`ElementKind`]: plain body, star (light source) or satellite (orbit)
//! - [`SolarSystemBuilder`]: appends bodies, parents before children
//! - [`SolarSystem`]: the frozen tree with the position/rotation queries
//!
//! Units: diameters in km, rotation periods in hours, orbital periods in
//! days, perihelion/aphelion in millions of km, inclinations in degrees.

mod element;
mod sol;

pub use element::*;
