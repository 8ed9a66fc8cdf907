use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;
use scene::{derive_basis, CameraBasis, CameraState, Config, Projection, Scene};

use crate::geodesic::{Ray, TraceSettings, Tracer};

/// Fixed output resolution, field of view and integrator settings for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f64,
    pub trace: TraceSettings,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.render.width,
            height: config.render.height,
            fov_degrees: config.camera.fov,
            trace: TraceSettings::from_config(config),
        }
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.width, self.height, self.fov_degrees)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Image {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("Could not write {}", path.display()))
    }
}

/// Everything a worker needs to shade a pixel, captured once per frame before dispatch.
pub struct FrameSnapshot<'a> {
    basis: CameraBasis,
    tracer: Tracer<'a>,
    width: u32,
    height: u32,
}

impl<'a> FrameSnapshot<'a> {
    pub fn new(scene: &'a Scene, camera: &CameraState, settings: &RenderSettings) -> Self {
        Self {
            basis: derive_basis(camera, &settings.projection()),
            tracer: Tracer::new(scene, &settings.trace),
            width: settings.width,
            height: settings.height,
        }
    }

    /// Primary ray through the center of pixel `(x, y)`.
    pub fn primary_ray(&self, x: u32, y: u32) -> Ray {
        let ndc_x = 2.0 * (x as f64 + 0.5) / self.width as f64 - 1.0;
        let ndc_y = 1.0 - 2.0 * (y as f64 + 0.5) / self.height as f64;
        Ray::new(self.basis.position, self.basis.ray_direction(ndc_x, ndc_y))
    }

    pub fn shade(&self, x: u32, y: u32) -> [u8; 4] {
        self.tracer.trace(&self.primary_ray(x, y)).to_rgba8()
    }
}

/// Traces every pixel of the frame. Rows are shaded in parallel; the image is returned only once complete.
pub fn render_frame(scene: &Scene, camera: &CameraState, settings: &RenderSettings) -> Image {
    let snapshot = FrameSnapshot::new(scene, camera, settings);
    let width = settings.width as usize;
    let mut pixels = vec![[0u8; 4]; width * settings.height as usize];

    pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = snapshot.shade(x as u32, y as u32);
            }
        });

    Image { width: settings.width, height: settings.height, pixels }
}

/// Renders a single frame of the configured scene and writes it as a PNG.
pub fn render_to_file<P: AsRef<Path>>(config: &Config, path: P) -> anyhow::Result<()> {
    let scene = config.build_scene().context("Invalid scene configuration")?;
    let settings = RenderSettings::from_config(config);

    let start = instant::Instant::now();
    let image = render_frame(&scene, &config.camera_state(), &settings);
    log::info!("Rendered {}x{} in {:?}", image.width(), image.height(), start.elapsed());

    image.save_png(&path)?;
    log::info!("Saved {}", path.as_ref().display());
    Ok(())
}
