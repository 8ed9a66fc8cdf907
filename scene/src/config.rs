use std::fs;
use std::path::Path;

use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;

use crate::camera::{CameraState, DEFAULT_DISTANCE};
use crate::physics::{BLACK_HOLE_MASS, SOLAR_MASS};
use crate::structs::{Body, Color, Disk, Scene, SceneError};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;
pub const DEFAULT_FOV: f64 = 60.0;
pub const DEFAULT_MAX_STEPS: u32 = 1024;
pub const DEFAULT_ESCAPE_FACTOR: f64 = 3.0;
pub const DEFAULT_STEP_FRACTION: f64 = 0.25;
pub const DEFAULT_BACKGROUND: Color = Color([0.01, 0.01, 0.03]);

/// Largest accepted image side in pixels.
pub const MAX_RESOLUTION: u32 = 8192;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid render settings: {0}")]
    Render(String),
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
    /// Vertical field of view in degrees.
    pub fov: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
            fov: DEFAULT_FOV,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub max_steps: u32,
    pub escape_factor: f64,
    pub step_fraction: f64,
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_steps: DEFAULT_MAX_STEPS,
            escape_factor: DEFAULT_ESCAPE_FACTOR,
            step_fraction: DEFAULT_STEP_FRACTION,
            background: DEFAULT_BACKGROUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlackHoleConfig {
    pub mass: f64,
    pub position: [f64; 3],
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self { mass: BLACK_HOLE_MASS, position: [0.0; 3] }
    }
}

/// Disk radii as multiples of the horizon radius.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskConfig {
    pub inner: f64,
    pub outer: f64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self { inner: 2.2, outer: 5.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub position: [f64; 3],
    pub radius: f64,
    pub mass: f64,
    pub color: Color,
}

impl From<&BodyConfig> for Body {
    fn from(value: &BodyConfig) -> Self {
        Body::new(DVec3::from_array(value.position), value.radius, value.mass, value.color)
    }
}

fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig {
            position: [4e11, 0.0, 0.0],
            radius: 4e10,
            mass: SOLAR_MASS,
            color: Color::new(1.0, 1.0, 0.0),
        },
        BodyConfig {
            position: [0.0, 0.0, 4e11],
            radius: 4e10,
            mass: SOLAR_MASS,
            color: Color::new(1.0, 0.0, 0.0),
        },
    ]
}

/// Startup configuration. Every section is optional and falls back to the default black hole scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub black_hole: BlackHoleConfig,
    pub disk: DiskConfig,
    pub bodies: Vec<BodyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            render: RenderConfig::default(),
            black_hole: BlackHoleConfig::default(),
            disk: DiskConfig::default(),
            bodies: default_bodies(),
        }
    }
}

impl Config {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let toml_str = fs::read_to_string(config_path)?;
        Self::from_str(&toml_str)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate_render()?;
        Ok(config)
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(ConfigError::Render(format!("resolution {}x{} must be non-zero", render.width, render.height)));
        }
        if render.width > MAX_RESOLUTION || render.height > MAX_RESOLUTION {
            return Err(ConfigError::Render(format!(
                "resolution {}x{} exceeds {MAX_RESOLUTION} pixels per side",
                render.width, render.height
            )));
        }
        if render.max_steps == 0 {
            return Err(ConfigError::Render("max_steps must be at least 1".to_string()));
        }
        if !(render.escape_factor.is_finite() && render.escape_factor > 1.0) {
            return Err(ConfigError::Render(format!("escape_factor {} must be greater than 1", render.escape_factor)));
        }
        if !(render.step_fraction > 0.0 && render.step_fraction < 1.0) {
            return Err(ConfigError::Render(format!("step_fraction {} must lie in (0, 1)", render.step_fraction)));
        }
        if !render.background.is_valid() {
            return Err(ConfigError::Render(format!("background {:?} must lie in [0, 1]", render.background.0)));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(ConfigError::Render(format!("fov {} must lie in (0, 180) degrees", self.camera.fov)));
        }
        Ok(())
    }

    /// Builds the scene with the black hole appended after the configured bodies.
    pub fn build_scene(&self) -> Result<Scene, SceneError> {
        let hole = Body::black_hole(DVec3::from_array(self.black_hole.position), self.black_hole.mass);
        let disk = Disk::from_horizon_multiples(hole.radius, self.disk.inner, self.disk.outer);

        let mut bodies: Vec<Body> = self.bodies.iter().map(Body::from).collect();
        let central = bodies.len();
        bodies.push(hole);
        log::debug!("Scene has {} bodies, horizon radius {:.4e} m", bodies.len(), hole.radius);
        Scene::new(bodies, central, disk)
    }

    pub fn camera_state(&self) -> CameraState {
        CameraState::new(self.camera.yaw, self.camera.pitch, self.camera.distance)
    }
}
