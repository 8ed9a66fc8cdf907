use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;

use crate::physics::{schwarzschild_radius, BLACK_HOLE_MASS, SOLAR_MASS};

/// Relative tolerance when checking a central body's radius against its Schwarzschild radius.
const HORIZON_TOLERANCE: f64 = 1e-6;

//-----------Color-----------------

/// Linear RGB color with every channel in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const BLACK: Color = Color([0.0, 0.0, 0.0]);

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self([
            self.0[0] + (other.0[0] - self.0[0]) * t,
            self.0[1] + (other.0[1] - self.0[1]) * t,
            self.0[2] + (other.0[2] - self.0[2]) * t,
        ])
    }

    pub fn scale(self, factor: f32) -> Self {
        Self([self.0[0] * factor, self.0[1] * factor, self.0[2] * factor])
    }

    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Quantizes to 8 bit RGBA with an opaque alpha channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.0[0]), q(self.0[1]), q(self.0[2]), 255]
    }
}

//-----------Body-----------------

/// A gravitating sphere. Positions and radii are in meters, mass in kilograms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: DVec3,
    pub radius: f64,
    pub mass: f64,
    pub color: Color,
}

impl Body {
    pub fn new(position: DVec3, radius: f64, mass: f64, color: Color) -> Self {
        Self { position, radius, mass, color }
    }

    /// A black body whose radius is its event horizon.
    pub fn black_hole(position: DVec3, mass: f64) -> Self {
        Self {
            position,
            radius: schwarzschild_radius(mass),
            mass,
            color: Color::BLACK,
        }
    }

    fn validate(&self, index: usize) -> Result<(), SceneError> {
        if !self.position.is_finite() {
            return Err(SceneError::NonFinitePosition { index });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SceneError::InvalidRadius { index, radius: self.radius });
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SceneError::InvalidMass { index, mass: self.mass });
        }
        if !self.color.is_valid() {
            return Err(SceneError::InvalidColor { index, color: self.color.0 });
        }
        Ok(())
    }
}

//-----------Disk-----------------

/// Accretion disk annulus around the central body, lying in the plane orthogonal to +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disk {
    pub inner: f64,
    pub outer: f64,
}

impl Disk {
    pub fn new(inner: f64, outer: f64) -> Self {
        Self { inner, outer }
    }

    pub fn from_horizon_multiples(horizon_radius: f64, inner: f64, outer: f64) -> Self {
        Self::new(horizon_radius * inner, horizon_radius * outer)
    }
}

//-----------Scene-----------------

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("scene has no bodies")]
    Empty,
    #[error("central body index {index} is out of range for {count} bodies")]
    CentralOutOfRange { index: usize, count: usize },
    #[error("body {index} has a non-finite position")]
    NonFinitePosition { index: usize },
    #[error("body {index} has invalid radius {radius} (must be finite and positive)")]
    InvalidRadius { index: usize, radius: f64 },
    #[error("body {index} has invalid mass {mass} (must be finite and positive)")]
    InvalidMass { index: usize, mass: f64 },
    #[error("body {index} has color {color:?} outside [0, 1]")]
    InvalidColor { index: usize, color: [f32; 3] },
    #[error("central body radius {radius} does not match its Schwarzschild radius {expected}")]
    HorizonMismatch { radius: f64, expected: f64 },
    #[error("disk radii inner={inner} outer={outer} must be finite with inner < outer")]
    InvalidDisk { inner: f64, outer: f64 },
    #[error("disk inner radius {inner} must lie outside the horizon radius {horizon}")]
    DiskInsideHorizon { inner: f64, horizon: f64 },
}

/// Immutable set of bodies plus the accretion disk.
///
/// One body is designated as central: its radius is the event horizon and the disk is centered on it.
/// Body order only matters for deterministic iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    bodies: Vec<Body>,
    central: usize,
    disk: Disk,
}

impl Scene {
    pub fn new(bodies: Vec<Body>, central: usize, disk: Disk) -> Result<Self, SceneError> {
        if bodies.is_empty() {
            return Err(SceneError::Empty);
        }
        if central >= bodies.len() {
            return Err(SceneError::CentralOutOfRange { index: central, count: bodies.len() });
        }
        for (index, body) in bodies.iter().enumerate() {
            body.validate(index)?;
        }

        let hole = &bodies[central];
        let expected = schwarzschild_radius(hole.mass);
        if ((hole.radius - expected) / expected).abs() > HORIZON_TOLERANCE {
            return Err(SceneError::HorizonMismatch { radius: hole.radius, expected });
        }

        if !(disk.inner.is_finite() && disk.outer.is_finite() && disk.inner < disk.outer) {
            return Err(SceneError::InvalidDisk { inner: disk.inner, outer: disk.outer });
        }
        if disk.inner <= hole.radius {
            return Err(SceneError::DiskInsideHorizon { inner: disk.inner, horizon: hole.radius });
        }

        Ok(Self { bodies, central, disk })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn central(&self) -> &Body {
        &self.bodies[self.central]
    }

    pub fn central_index(&self) -> usize {
        self.central
    }

    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    /// Distance from the central body to the farthest point of any body or of the disk.
    pub fn extent(&self) -> f64 {
        let center = self.central().position;
        self.bodies
            .iter()
            .map(|body| body.position.distance(center) + body.radius)
            .fold(self.disk.outer, f64::max)
    }

    /// Radius of the smallest body, which bounds the finest step the integrator needs.
    pub fn smallest_radius(&self) -> f64 {
        self.bodies.iter().map(|body| body.radius).fold(f64::INFINITY, f64::min)
    }
}

/// Builds the default scene: a black hole at the origin with its accretion disk,
/// and two solar-mass spheres orbiting on the +X and +Z axes.
pub fn build_scene() -> Result<Scene, SceneError> {
    let hole = Body::black_hole(DVec3::ZERO, BLACK_HOLE_MASS);
    let disk = Disk::from_horizon_multiples(hole.radius, 2.2, 5.2);
    let bodies = vec![
        Body::new(DVec3::new(4e11, 0.0, 0.0), 4e10, SOLAR_MASS, Color::new(1.0, 1.0, 0.0)),
        Body::new(DVec3::new(0.0, 0.0, 4e11), 4e10, SOLAR_MASS, Color::new(1.0, 0.0, 0.0)),
        hole,
    ];
    Scene::new(bodies, 2, disk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hole() -> Body {
        Body::black_hole(DVec3::ZERO, BLACK_HOLE_MASS)
    }

    fn disk_for(hole: &Body) -> Disk {
        Disk::from_horizon_multiples(hole.radius, 2.2, 5.2)
    }

    #[test]
    fn test_build_scene_default() {
        let scene = build_scene().expect("default scene must be valid");
        assert_eq!(scene.bodies().len(), 3);
        assert_eq!(scene.central_index(), 2);
        assert_eq!(scene.central().color, Color::BLACK);
        assert_relative_eq!(scene.disk().inner, scene.central().radius * 2.2);
        assert_relative_eq!(scene.disk().outer, scene.central().radius * 5.2);
        assert_relative_eq!(scene.extent(), 4.4e11, max_relative = 1e-12);
        assert_relative_eq!(scene.smallest_radius(), scene.central().radius);
    }

    #[test]
    fn test_scene_empty() {
        assert_eq!(Scene::new(Vec::new(), 0, Disk::new(1.0, 2.0)), Err(SceneError::Empty));
    }

    #[test]
    fn test_scene_central_out_of_range() {
        let hole = hole();
        let result = Scene::new(vec![hole], 1, disk_for(&hole));
        assert_eq!(result, Err(SceneError::CentralOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn test_scene_rejects_zero_mass() {
        let hole = hole();
        let bad = Body::new(DVec3::X, 1.0, 0.0, Color::BLACK);
        let result = Scene::new(vec![bad, hole], 1, disk_for(&hole));
        assert!(matches!(result, Err(SceneError::InvalidMass { index: 0, .. })));
    }

    #[test]
    fn test_scene_rejects_negative_radius() {
        let hole = hole();
        let bad = Body::new(DVec3::X, -1.0, 1.0, Color::BLACK);
        let result = Scene::new(vec![hole, bad], 0, disk_for(&hole));
        assert!(matches!(result, Err(SceneError::InvalidRadius { index: 1, .. })));
    }

    #[test]
    fn test_scene_rejects_color_out_of_range() {
        let hole = hole();
        let bad = Body::new(DVec3::X, 1.0, 1.0, Color::new(1.5, 0.0, 0.0));
        let result = Scene::new(vec![hole, bad], 0, disk_for(&hole));
        assert!(matches!(result, Err(SceneError::InvalidColor { index: 1, .. })));
    }

    #[test]
    fn test_scene_rejects_nan_position() {
        let hole = hole();
        let bad = Body::new(DVec3::new(f64::NAN, 0.0, 0.0), 1.0, 1.0, Color::BLACK);
        let result = Scene::new(vec![hole, bad], 0, disk_for(&hole));
        assert_eq!(result, Err(SceneError::NonFinitePosition { index: 1 }));
    }

    #[test]
    fn test_scene_rejects_wrong_horizon() {
        let mut hole = hole();
        let disk = disk_for(&hole);
        hole.radius *= 1.5;
        let result = Scene::new(vec![hole], 0, disk);
        assert!(matches!(result, Err(SceneError::HorizonMismatch { .. })));
    }

    #[test]
    fn test_scene_rejects_inverted_disk() {
        let hole = hole();
        let result = Scene::new(vec![hole], 0, Disk::from_horizon_multiples(hole.radius, 5.2, 2.2));
        assert!(matches!(result, Err(SceneError::InvalidDisk { .. })));
    }

    #[test]
    fn test_scene_rejects_disk_inside_horizon() {
        let hole = hole();
        let result = Scene::new(vec![hole], 0, Disk::from_horizon_multiples(hole.radius, 0.5, 5.2));
        assert!(matches!(result, Err(SceneError::DiskInsideHorizon { .. })));
    }

    #[test]
    fn test_color_to_rgba8() {
        assert_eq!(Color::new(1.0, 0.0, 0.5).to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(Color::new(2.0, -1.0, 0.0).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_color_lerp() {
        let a = Color::new(0.0, 0.0, 0.0);
        let b = Color::new(1.0, 0.5, 0.25);
        assert_eq!(a.lerp(b, 0.5), Color::new(0.5, 0.25, 0.125));
        assert_eq!(a.lerp(b, 3.0), b);
    }
}
