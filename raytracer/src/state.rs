use std::sync::Arc;

use anyhow::Context;
use winit::{event::*, window::Window};

use wgpu_utils::{setup_gpu, BindGroupDescriptor, BindingResourceTemplate, BufferType, FrameTexture, Gpu};

use scene::{CameraController, CameraState, Scene};

use crate::frame::{render_frame, RenderSettings};
use crate::helper::{letterbox, setup_scene};

/// Grey drawn around the letterboxed image.
const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.04, g: 0.04, b: 0.04, a: 1.0 };

pub struct State {
    pub window: Arc<Window>,
    gpu: Gpu,
    pub size: winit::dpi::PhysicalSize<u32>,
    //Frame
    frame_texture: FrameTexture,
    screen_render_pipeline: wgpu::RenderPipeline,
    screen_bind_group: wgpu::BindGroup,
    //Scene
    scene: Scene,
    settings: RenderSettings,
    //Camera
    camera: CameraState,
    pub camera_controller: CameraController,
    pub mouse_pressed: bool,
    frame_time: std::time::Duration,
}

impl State {
    /// Constructs a new `State` instance.
    ///
    /// Initializes the GPU for the window, builds the scene and camera from the configuration and sets up
    /// the pipeline that copies the traced frame to the screen.
    ///
    /// # Errors
    ///
    /// Fails if the scene is invalid, no usable graphics adapter is found or the resolution exceeds the
    /// device's texture limit.
    pub async fn new(window: Arc<Window>, userconfig: &scene::Config) -> anyhow::Result<Self> {
        //---------Setup Hardware---------
        let gpu = setup_gpu(window.clone()).await.context("GPU setup failed")?;
        let size = gpu.size;
        log::info!("Hardware initialized");

        //-------------Scene--------------
        let (scene, camera, camera_controller, settings) = setup_scene(userconfig)?;

        //----------Frame Texture---------
        // The frame keeps its configured resolution, only the viewport follows the window
        let frame_texture = FrameTexture::new(&gpu.device, settings.width, settings.height)
            .context("Configured resolution is not supported by the graphics device")?;

        //----------Transfer to screen-------------
        let screen_shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Screen Transfer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../res/shader/screen-shader.wgsl").into()),
        });

        // Nearest filtering, no smoothing between traced pixels
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Bind the sampler and the frame texture for the screen shader
        let (screen_bind_group_layout, screen_bind_group) = {
            let screen_bind_group_descriptor = BindGroupDescriptor::new(
                Some("screen_transfer"),
                wgpu::ShaderStages::FRAGMENT,
                vec![
                    BufferType::new(BindingResourceTemplate::Sampler(wgpu::BindingResource::Sampler(&sampler))),
                    BufferType::with_view_dimension(
                        BindingResourceTemplate::TextureView(wgpu::BindingResource::TextureView(&frame_texture.view)),
                        wgpu::TextureViewDimension::D2,
                    )?,
                ],
            );

            let layout = screen_bind_group_descriptor.generate_bind_group_layout(&gpu.device);
            let bind_group = screen_bind_group_descriptor.generate_bind_group(&gpu.device, &layout);
            (layout, bind_group)
        };

        let screen_pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Screen Transfer Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let screen_render_pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Screen Transfer Pipeline"),
            layout: Some(&screen_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &screen_shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &screen_shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            multiview: None,
        });
        log::info!("Screen transfer shader&pipeline ready");

        Ok(Self {
            window,
            gpu,
            size,
            frame_texture,
            screen_render_pipeline,
            screen_bind_group,
            scene,
            settings,
            camera,
            camera_controller,
            mouse_pressed: false,
            frame_time: std::time::Duration::ZERO,
        })
    }

    /// Reconfigures the surface for the new window size. The traced resolution stays fixed.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.size = new_size;
        self.gpu.resize(new_size);
    }

    /// Handles window input for the camera. Returns true if the event was consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseWheel { delta, .. } => {
                self.camera_controller.process_scroll(delta);
                true
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.mouse_pressed = *state == ElementState::Pressed;
                true
            }
            _ => false,
        }
    }

    /// Applies the input gathered since the last frame. Must run before `render` so the frame sees a settled camera.
    pub fn update(&mut self, dt: std::time::Duration) {
        self.frame_time = dt;
        if self.camera_controller.has_pending_input() {
            self.camera_controller.update_camera(&mut self.camera);
            log::trace!(
                "Camera yaw {:.3} pitch {:.3} distance {:.3e}",
                self.camera.yaw(),
                self.camera.pitch(),
                self.camera.distance()
            );
        }
    }

    /// Traces a frame and draws it letterboxed into the window.
    ///
    /// The surface is acquired first, so a lost or outdated surface skips the trace entirely.
    /// A minimised window draws nothing.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.gpu.has_area() {
            return Ok(());
        }

        // Get the current output texture from the surface
        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        //----------Trace----------
        let start = instant::Instant::now();
        let image = render_frame(&self.scene, &self.camera, &self.settings);
        log::debug!(
            "Traced {}x{} in {:?} (frame interval {:?})",
            image.width(),
            image.height(),
            start.elapsed(),
            self.frame_time
        );

        if let Err(error) = self.frame_texture.upload(&self.gpu.queue, image.as_bytes()) {
            log::error!("{error:#}");
            return Ok(());
        }

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        //----------Render pass----------
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(viewport) = letterbox(
                self.frame_texture.width,
                self.frame_texture.height,
                self.gpu.config.width,
                self.gpu.config.height,
            ) {
                render_pass.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height, 0.0, 1.0);
                render_pass.set_pipeline(&self.screen_render_pipeline);
                render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
