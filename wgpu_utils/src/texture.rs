/// Fixed-size RGBA8 texture the traced frame is uploaded into.
pub struct FrameTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl FrameTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates the texture after checking the size against the device's 2D texture limit.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> anyhow::Result<Self> {
        check_frame_size(width, height, device.limits().max_texture_dimension_2d)?;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view, width, height })
    }

    /// Bytes per full frame.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Replaces the whole texture with tightly packed RGBA8 rows.
    pub fn upload(&self, queue: &wgpu::Queue, pixels: &[u8]) -> anyhow::Result<()> {
        if pixels.len() != self.byte_len() {
            anyhow::bail!("Frame has {} bytes, texture expects {}", pixels.len(), self.byte_len());
        }
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d { width: self.width, height: self.height, depth_or_array_layers: 1 },
        );
        Ok(())
    }
}

/// Fails if a frame of `width` x `height` does not fit a 2D texture of at most `max_dimension` per side.
pub fn check_frame_size(width: u32, height: u32, max_dimension: u32) -> anyhow::Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("Frame size {width}x{height} is empty");
    }
    if width > max_dimension || height > max_dimension {
        anyhow::bail!("Frame size {width}x{height} exceeds the device texture limit of {max_dimension}");
    }
    Ok(())
}
