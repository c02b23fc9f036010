use anyhow::Result;
use clap::Parser;
use orbitlab_common::Extent;
use orbitlab_input::{MouseButton, MouseInput};
use orbitlab_render::RendererConfig;
use orbitlab_render_wgpu::{ErrorClass, FrameStatus, RenderError, Renderer};
use orbitlab_scene::OrbitCamera;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "orbitlab-desktop", about = "Orbit an instanced cube ring")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON renderer config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of cubes on the ring
    #[arg(long)]
    instances: Option<usize>,

    /// Cube texture (PNG)
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Directory with px/nx/py/ny/pz/nz sky faces
    #[arg(long)]
    sky: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    fn renderer_config(&self) -> Result<RendererConfig> {
        let mut config = match &self.config {
            Some(path) => RendererConfig::from_json_file(path)?,
            None => RendererConfig::default(),
        };
        if let Some(count) = self.instances {
            config.scene.instance_count = count;
        }
        if let Some(path) = &self.texture {
            config.assets.texture = Some(path.clone());
        }
        if let Some(dir) = &self.sky {
            config.assets.sky = Some(dir.clone());
        }
        config.size = Extent::new(
            self.width.unwrap_or(config.size.width),
            self.height.unwrap_or(config.size.height),
        );
        config.validate()?;
        Ok(config)
    }
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

struct App {
    config: RendererConfig,
    camera: OrbitCamera,
    mouse: MouseInput,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    fatal: Option<RenderError>,
}

impl App {
    fn new(config: RendererConfig) -> Self {
        Self {
            config,
            camera: OrbitCamera::default(),
            mouse: MouseInput::new(),
            window: None,
            renderer: None,
            fatal: None,
        }
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop, error: Option<RenderError>) {
        if let Some(renderer) = &mut self.renderer {
            renderer.shutdown();
        }
        if let Some(error) = error {
            tracing::error!("stopping: {error}");
            self.fatal = Some(error);
        }
        event_loop.exit();
    }

    /// Route a renderer error: usage errors are logged and the loop goes on,
    /// everything else ends it.
    fn handle(&mut self, event_loop: &ActiveEventLoop, error: RenderError) {
        match error.class() {
            ErrorClass::Usage => tracing::warn!("{error}"),
            ErrorClass::FatalInit | ErrorClass::DeviceLost => self.stop(event_loop, Some(error)),
        }
    }

    fn frame(&mut self) -> Result<FrameStatus, RenderError> {
        let Some(renderer) = &mut self.renderer else {
            return Ok(FrameStatus::Skipped);
        };
        self.camera.apply(self.mouse.poll());
        renderer.update(&self.camera)?;
        renderer.render()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = self.config.size.at_least_one();
        let attrs = Window::default_attributes()
            .with_title("orbitlab")
            .with_inner_size(PhysicalSize::new(size.width, size.height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match Renderer::new(window.clone(), &self.config) {
            Ok(renderer) => {
                if let Some(info) = renderer.adapter_info() {
                    tracing::info!("rendering on {} ({})", info.name, info.backend.to_str());
                }
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(e) => self.stop(event_loop, Some(e)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.stop(event_loop, None),
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                        self.handle(event_loop, e);
                    }
                }
            }
            WindowEvent::Focused(focused) => self.mouse.on_focus(focused),
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = map_button(button) {
                    self.mouse.on_button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, lines) => self.mouse.on_wheel_lines(lines),
                MouseScrollDelta::PixelDelta(pos) => self.mouse.on_wheel(pos.y as f32),
            },
            WindowEvent::RedrawRequested => match self.frame() {
                Ok(FrameStatus::Presented) => {}
                Ok(FrameStatus::Skipped) => tracing::debug!("frame skipped"),
                Err(e) => self.handle(event_loop, e),
            },
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.renderer_config()?;
    tracing::info!("orbitlab-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
