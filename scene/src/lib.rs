//! # Scene
//!
//! This crate contains everything the integrator reads: the gravitating bodies, the accretion disk and the orbit camera.
//!
//! ## Modules
//!
//! - `camera`: Orbit state, the per-frame view basis and the controller that turns pointer input into orbit deltas.
//! - `config`: Loads the TOML configuration and turns it into a scene and a camera.
//! - `physics`: Physical constants and the Schwarzschild relation.
//! - `structs`: `Body`, `Disk`, `Scene` and `Color`, plus scene validation.
//!
//! ## Usage
//!
//! ```
//! use scene::{build_scene, derive_basis, CameraState, Projection};
//!
//! let scene = build_scene().expect("default scene is valid");
//! let basis = derive_basis(&CameraState::default(), &Projection::new(640, 480, 60.0));
//! assert_eq!(scene.bodies().len(), 3);
//! assert!(basis.forward.is_normalized());
//! ```
mod camera;
mod config;
mod physics;
mod structs;

pub use camera::{
    derive_basis, CameraBasis, CameraController, CameraState, Projection, MIN_DISTANCE, PITCH_LIMIT,
};
pub use config::{
    BlackHoleConfig, BodyConfig, CameraConfig, Config, ConfigError, DiskConfig, RenderConfig,
    MAX_RESOLUTION,
};
pub use physics::{schwarzschild_radius, BLACK_HOLE_MASS, C, G, SOLAR_MASS};
pub use structs::{build_scene, Body, Color, Disk, Scene, SceneError};

pub use glam::DVec3;
