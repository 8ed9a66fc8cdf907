use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use winit::{event::*, event_loop::{ControlFlow, EventLoop}, keyboard::{Key, NamedKey}};

pub mod frame;
pub mod geodesic;
pub mod helper;
pub mod state;

pub use frame::{render_frame, render_to_file, FrameSnapshot, Image, RenderSettings};
pub use geodesic::{trace, Ray, Termination, TraceResult, TraceSettings, Tracer};
pub use helper::{letterbox, load_config, setup_scene, Viewport};

use crate::state::State;

/// What to run and with which configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// TOML configuration. The built-in scene is used when absent.
    pub config_path: Option<PathBuf>,
    /// Render a single frame to this PNG instead of opening a window.
    pub output: Option<PathBuf>,
}

/// Starts the application.
///
/// Initializes the logger and loads the configuration. With `output` set a single frame is traced and
/// written to disk. Otherwise a window is opened and the event loop takes over:
/// - Closing the window or pressing Escape exits
/// - Left-drag orbits the camera, the wheel zooms
/// - Every redraw applies pending input, then traces and presents a frame
/// - Lost or outdated surfaces are reconfigured, timeouts are skipped
///
/// # Errors
///
/// Returns setup failures: unreadable configuration, invalid scene, no window or no graphics adapter.
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    env_logger::init();

    let userconfig = load_config(options.config_path.as_deref())?;

    if let Some(output) = options.output {
        return render_to_file(&userconfig, output);
    }

    let event_loop = EventLoop::new().context("Could not create event loop")?;
    let title = env!("CARGO_PKG_NAME");
    let window = winit::window::WindowBuilder::new()
        .with_title(title)
        .with_inner_size(winit::dpi::LogicalSize::new(userconfig.render.width, userconfig.render.height))
        .build(&event_loop)
        .context("Could not create window")?;
    let window = Arc::new(window);

    // ControlFlow::Poll continuously runs the event loop,
    // even if the OS hasn't dispatched any events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = State::new(window, &userconfig).await?;
    let mut last_render_time = instant::Instant::now();

    // Start the event loop
    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window.id() && !state.input(event) => {
                // Handle window events that aren't camera input
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                logical_key: Key::Named(NamedKey::Escape),
                                ..
                            },
                        ..
                    } => elwt.exit(),
                    WindowEvent::RedrawRequested => {
                        let now = instant::Instant::now();
                        let dt = now - last_render_time;
                        last_render_time = now;
                        state.update(dt);
                        match state.render() {
                            Ok(_) => {}
                            // Reconfigure the surface if it's lost or outdated
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size),
                            // The system is out of memory, we should probably quit
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("Surface out of memory");
                                elwt.exit()
                            }
                            // We're ignoring timeouts
                            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                        }
                    }
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        log::debug!("Window={window_id:?} changed scale to {scale_factor}");
                    }
                    _ => {}
                };
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if state.mouse_pressed {
                    state.camera_controller.process_mouse(delta.0, delta.1)
                }
            }
            // Request a redraw before the system goes to idle
            Event::AboutToWait => {
                state.window.request_redraw();
            }
            _ => (),
        }
    })?;

    Ok(())
}
