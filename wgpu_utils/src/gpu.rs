use std::sync::Arc;

use anyhow::{anyhow, Context};
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Device, queue and the configured window surface.
pub struct Gpu {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
}

impl Gpu {
    /// Reconfigures the surface. A zero-sized window keeps the old configuration.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn has_area(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }
}

/// Picks a non-sRGB format when the surface offers one, so traced colors are shown unchanged.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first().copied())
}

pub async fn setup_gpu(window: Arc<Window>) -> anyhow::Result<Gpu> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let size = window.inner_size();
    let surface = instance
        .create_surface(window)
        .context("Failed to create surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("No compatible graphics adapter found"))?;

    log::info!("Using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Presentation Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            },
            None,
        )
        .await
        .context("Failed to request device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let format = pick_surface_format(&surface_caps.formats)
        .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
    log::debug!("Surface format {:?}", format);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    Ok(Gpu { surface, device, queue, config, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_surface_format_prefers_linear() {
        let formats = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn test_pick_surface_format_falls_back_to_first() {
        let formats = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(wgpu::TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_surface_format(&[]), None);
    }
}
