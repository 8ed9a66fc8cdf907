use std::path::Path;

use anyhow::Context;
use scene::{CameraController, CameraState, Config, Scene};

use crate::frame::RenderSettings;

/// Loads the startup configuration.
///
/// Without a path the built-in black hole scene is used. An explicit path that cannot be read or
/// parsed is an error.
///
/// # Arguments
///
/// * `config_path` - Optional path to a TOML configuration file.
///
/// # Errors
///
/// Returns the I/O or parse error with the offending path attached.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => {
            let config = Config::new(path).with_context(|| format!("Could not load config {}", path.display()))?;
            log::info!("Loaded config {}", path.display());
            Ok(config)
        }
        None => {
            log::info!("No config given, using the default scene");
            Ok(Config::default())
        }
    }
}

/// Sets up the scene, the orbit camera and the fixed render settings for a run.
///
/// # Arguments
///
/// * `userconfig` - The loaded configuration.
///
/// # Returns
///
/// * `Scene` - The validated scene with the black hole as central body.
/// * `CameraState` - The initial orbit of the camera.
/// * `CameraController` - A controller with the default pan and zoom sensitivities.
/// * `RenderSettings` - Output resolution, field of view and integrator settings.
///
/// # Example
///
/// ```
/// let userconfig = scene::Config::default();
/// let (scene, camera, _controller, settings) = lensing_lib::setup_scene(&userconfig).unwrap();
/// assert_eq!(scene.bodies().len(), 3);
/// assert_eq!(camera.distance(), 1e11);
/// assert_eq!((settings.width, settings.height), (640, 480));
/// ```
pub fn setup_scene(userconfig: &Config) -> anyhow::Result<(Scene, CameraState, CameraController, RenderSettings)> {
    let scene = userconfig.build_scene().context("Invalid scene configuration")?;
    let camera = userconfig.camera_state();
    let settings = RenderSettings::from_config(userconfig);
    log::info!(
        "Scene ready: {} bodies, horizon radius {:.4e} m, {}x{} image",
        scene.bodies().len(),
        scene.central().radius,
        settings.width,
        settings.height
    );
    Ok((scene, camera, CameraController::default(), settings))
}

/// Region of the output surface the image is drawn into, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fits an image into a surface while keeping its aspect ratio, centered on both axes.
///
/// The viewport is snapped to whole pixels and the unused bands on either side are left for the
/// clear color. Returns `None` if either size is empty.
///
/// # Example
///
/// ```
/// use lensing_lib::letterbox;
///
/// // A 4:3 image on a 16:9 surface gets bars left and right
/// let viewport = letterbox(640, 480, 1920, 1080).unwrap();
/// assert_eq!((viewport.width, viewport.height), (1440.0, 1080.0));
/// assert_eq!((viewport.x, viewport.y), (240.0, 0.0));
/// ```
pub fn letterbox(image_width: u32, image_height: u32, surface_width: u32, surface_height: u32) -> Option<Viewport> {
    if image_width == 0 || image_height == 0 || surface_width == 0 || surface_height == 0 {
        return None;
    }

    let image_aspect = image_width as f32 / image_height as f32;
    let surface_aspect = surface_width as f32 / surface_height as f32;
    let (surface_width, surface_height) = (surface_width as f32, surface_height as f32);

    let (width, height) = if surface_aspect > image_aspect {
        // Surface is wider: pillarbox
        (surface_height * image_aspect, surface_height)
    } else {
        (surface_width, surface_width / image_aspect)
    };

    // Snap to whole pixels
    let (width, height) = (width.round().max(1.0), height.round().max(1.0));
    Some(Viewport {
        x: ((surface_width - width) * 0.5).floor(),
        y: ((surface_height - height) * 0.5).floor(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_letterbox_same_aspect_fills_surface() {
        let viewport = letterbox(640, 480, 1280, 960).unwrap();
        assert_eq!(viewport, Viewport { x: 0.0, y: 0.0, width: 1280.0, height: 960.0 });
    }

    #[test]
    fn test_letterbox_wide_surface_pillarbox() {
        let viewport = letterbox(640, 480, 1920, 1080).unwrap();
        assert_relative_eq!(viewport.width, 1440.0);
        assert_relative_eq!(viewport.height, 1080.0);
        assert_relative_eq!(viewport.x, 240.0);
        assert_relative_eq!(viewport.y, 0.0);
    }

    #[test]
    fn test_letterbox_tall_surface_bars_top_and_bottom() {
        let viewport = letterbox(640, 480, 800, 1000).unwrap();
        assert_relative_eq!(viewport.width, 800.0);
        assert_relative_eq!(viewport.height, 600.0);
        assert_relative_eq!(viewport.x, 0.0);
        assert_relative_eq!(viewport.y, 200.0);
    }

    #[test]
    fn test_letterbox_stays_inside_surface() {
        for (w, h) in [(1, 1), (3, 1000), (1000, 3), (1199, 801), (801, 1199)] {
            let viewport = letterbox(640, 480, w, h).unwrap();
            assert!(viewport.x >= 0.0 && viewport.y >= 0.0);
            assert!(viewport.x + viewport.width <= w as f32 + 1e-3);
            assert!(viewport.y + viewport.height <= h as f32 + 1e-3);
            assert!((viewport.width - viewport.height * 640.0 / 480.0).abs() <= 1.0);
        }
    }

    #[test]
    fn test_letterbox_empty_surface() {
        assert_eq!(letterbox(640, 480, 0, 600), None);
        assert_eq!(letterbox(640, 480, 800, 0), None);
        assert_eq!(letterbox(0, 480, 800, 600), None);
    }

    #[test]
    fn test_load_config_default_without_path() {
        let config = load_config(None).expect("Default config must load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let error = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn test_setup_scene_uses_config() {
        let userconfig = Config::from_str("[render]\nwidth = 320\nheight = 240\n[camera]\ndistance = 2.0e11").unwrap();
        let (scene, camera, controller, settings) = setup_scene(&userconfig).unwrap();
        assert_eq!(scene.central_index(), 2);
        assert_eq!(camera.distance(), 2.0e11);
        assert!(!controller.has_pending_input());
        assert_eq!((settings.width, settings.height), (320, 240));
    }

    #[test]
    fn test_setup_scene_rejects_invalid_scene() {
        let userconfig = Config::from_str("[disk]\ninner = 0.5").unwrap();
        assert!(setup_scene(&userconfig).is_err());
    }
}
