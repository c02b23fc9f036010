use crate::context::GpuContext;
use crate::error::RenderError;
use crate::opaque::OpaquePass;
use crate::postproc::PostProc;
use crate::sky::Sky;
use crate::targets::RenderTargets;
use crate::texture::COLOR_FORMAT;
use crate::transparent::Transparent;
use orbitlab_assets::SceneTextures;
use orbitlab_common::Extent;
use orbitlab_render::{
    FRAME_PASSES, FrameRenderer, FrameState, Lifecycle, LifecycleError, Pass, PassTarget, Phase,
    RendererConfig,
};
use orbitlab_scene::OrbitCamera;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use winit::window::Window;

/// Outcome of one `render` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was unavailable this frame; nothing was drawn.
    Skipped,
}

/// Where the post-process pass writes.
enum Backbuffer {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    /// Offscreen stand-in for a swapchain, used without a window.
    Headless {
        view: wgpu::TextureView,
        texture: wgpu::Texture,
    },
}

enum AcquiredFrame {
    Surface {
        view: wgpu::TextureView,
        texture: wgpu::SurfaceTexture,
    },
    Headless,
}

impl Backbuffer {
    fn surface(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        extent: Extent,
    ) -> Result<Self, RenderError> {
        let caps = surface.get_capabilities(adapter);
        let mut config = surface
            .get_default_config(adapter, extent.width, extent.height)
            .ok_or(RenderError::IncompatibleSurface)?;
        if let Some(srgb) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            config.format = srgb;
        }
        config.present_mode = wgpu::PresentMode::Fifo;
        config.desired_maximum_frame_latency = 2;
        surface.configure(device, &config);
        Ok(Backbuffer::Surface { surface, config })
    }

    fn headless(device: &wgpu::Device, extent: Extent) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("headless_backbuffer"),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        Backbuffer::Headless { view, texture }
    }

    fn format(&self) -> wgpu::TextureFormat {
        match self {
            Backbuffer::Surface { config, .. } => config.format,
            Backbuffer::Headless { .. } => COLOR_FORMAT,
        }
    }

    fn resize(&mut self, device: &wgpu::Device, extent: Extent) {
        match self {
            Backbuffer::Surface { surface, config } => {
                config.width = extent.width;
                config.height = extent.height;
                surface.configure(device, config);
            }
            Backbuffer::Headless { .. } => *self = Backbuffer::headless(device, extent),
        }
    }

    /// `Ok(None)` means skip this frame: the surface was reconfigured or
    /// timed out and the next frame may succeed.
    fn acquire(&self, device: &wgpu::Device) -> Result<Option<AcquiredFrame>, RenderError> {
        let (surface, config) = match self {
            Backbuffer::Headless { .. } => return Ok(Some(AcquiredFrame::Headless)),
            Backbuffer::Surface { surface, config } => (surface, config),
        };
        match surface.get_current_texture() {
            Ok(texture) => {
                let view = texture.texture.create_view(&Default::default());
                Ok(Some(AcquiredFrame::Surface { view, texture }))
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated, reconfiguring");
                surface.configure(device, config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring surface texture");
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, "surface acquire failed");
                Err(RenderError::Present(e))
            }
        }
    }

    fn target_view<'a>(&'a self, frame: &'a AcquiredFrame) -> Option<&'a wgpu::TextureView> {
        match (frame, self) {
            (AcquiredFrame::Surface { view, .. }, _) => Some(view),
            (AcquiredFrame::Headless, Backbuffer::Headless { view, .. }) => Some(view),
            (AcquiredFrame::Headless, Backbuffer::Surface { .. }) => None,
        }
    }
}

impl AcquiredFrame {
    fn present(self) {
        if let AcquiredFrame::Surface { texture, .. } = self {
            texture.present();
        }
    }
}

/// Everything owned on the device.
///
/// Fields drop top to bottom, the reverse of the order `build` creates them:
/// pass resources first, then the size-dependent targets, the backbuffer, and
/// the device itself last.
struct GpuState {
    post: PostProc,
    transparent: Transparent,
    sky: Sky,
    opaque: OpaquePass,
    targets: RenderTargets,
    backbuffer: Backbuffer,
    context: GpuContext,
}

/// wgpu renderer for the orbit scene.
///
/// Lifecycle: construct (init), then `update` and `render` once per frame,
/// `resize` whenever the window changes, `shutdown` once at the end.
pub struct Renderer {
    gpu: Option<GpuState>,
    state: FrameState,
    lifecycle: Lifecycle,
    clear_color: wgpu::Color,
    started: Instant,
}

impl Renderer {
    /// Create a renderer presenting to `window`.
    pub fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let extent = Extent::new(size.width, size.height).at_least_one();
        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(window)?;
        let context = GpuContext::request(instance, Some(&surface))?;
        let backbuffer = Backbuffer::surface(surface, &context.adapter, &context.device, extent)?;
        Self::build(context, backbuffer, extent, config)
    }

    /// Create a renderer that draws into an offscreen backbuffer.
    pub fn headless(width: u32, height: u32, config: &RendererConfig) -> Result<Self, RenderError> {
        let extent = Extent::new(width, height).at_least_one();
        let context = GpuContext::request(GpuContext::create_instance(), None)?;
        let backbuffer =
            context.validated("headless_backbuffer", |device| Backbuffer::headless(device, extent))?;
        Self::build(context, backbuffer, extent, config)
    }

    fn build(
        context: GpuContext,
        backbuffer: Backbuffer,
        extent: Extent,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let state = FrameState::new(
            orbitlab_scene::Scene::from_config(&config.scene)?,
            config.projection,
            extent,
        );
        let textures = SceneTextures::load(&config.assets)?;
        let depth = config.projection.depth;

        let (targets, opaque, sky, transparent, post) =
            context.validated("scene_resources", |device| {
                let targets = RenderTargets::new(device, extent);
                let opaque = OpaquePass::new(&context, &textures.cube, depth)?;
                let sky = Sky::new(&context, &textures.sky, config.projection, extent)?;
                let transparent = Transparent::new(&context, depth)?;
                let post = PostProc::new(&context, backbuffer.format())?;
                Ok::<_, RenderError>((targets, opaque, sky, transparent, post))
            })??;

        info!(
            width = extent.width,
            height = extent.height,
            instances = state.scene().instances.len(),
            lights = state.scene().lights.count(),
            "renderer initialized"
        );

        let [r, g, b, a] = config.clear_color;
        Ok(Self {
            gpu: Some(GpuState {
                post,
                transparent,
                sky,
                opaque,
                targets,
                backbuffer,
                context,
            }),
            state,
            lifecycle: Lifecycle::ready(),
            clear_color: wgpu::Color { r, g, b, a },
            started: Instant::now(),
        })
    }

    fn gpu(&self) -> Result<&GpuState, RenderError> {
        self.gpu.as_ref().ok_or(RenderError::Lifecycle(LifecycleError::ShutDown))
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn frame_state(&self) -> &FrameState {
        &self.state
    }

    /// Bumped each time the size-dependent targets are rebuilt; `None` after
    /// shutdown.
    pub fn targets_generation(&self) -> Option<u64> {
        self.gpu.as_ref().map(|gpu| gpu.targets.generation())
    }

    pub fn sky_radius(&self) -> Option<f32> {
        self.gpu.as_ref().map(|gpu| gpu.sky.radius())
    }

    /// The offscreen backbuffer of a headless renderer, for readback.
    pub fn headless_target(&self) -> Option<&wgpu::Texture> {
        match self.gpu.as_ref().map(|gpu| &gpu.backbuffer) {
            Some(Backbuffer::Headless { texture, .. }) => Some(texture),
            _ => None,
        }
    }

    pub fn adapter_info(&self) -> Option<wgpu::AdapterInfo> {
        self.gpu.as_ref().map(|gpu| gpu.context.adapter.get_info())
    }

    /// Update using the time since the renderer was created.
    pub fn update(&mut self, camera: &OrbitCamera) -> Result<(), RenderError> {
        let now_ms = self.started.elapsed().as_millis() as u64;
        self.update_at(camera, now_ms)
    }

    pub fn update_at(&mut self, camera: &OrbitCamera, now_ms: u64) -> Result<(), RenderError> {
        let gpu = self.gpu.as_ref().ok_or(LifecycleError::ShutDown)?;
        gpu.context.ensure_alive()?;
        self.lifecycle.begin_update()?;
        self.state.update(camera, now_ms);

        let queue = &gpu.context.queue;
        gpu.opaque.upload(queue, &self.state);
        gpu.sky.update(queue, self.state.sky_view());
        gpu.transparent.update(queue, self.state.view_projection());
        Ok(())
    }

    pub fn render(&mut self) -> Result<FrameStatus, RenderError> {
        self.lifecycle.begin_render()?;
        let gpu = self.gpu()?;
        let device = &gpu.context.device;
        gpu.context.ensure_alive()?;

        let Some(frame) = gpu.backbuffer.acquire(device)? else {
            return Ok(FrameStatus::Skipped);
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &gpu.targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.state.projection().depth.clear_value()),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            for step in FRAME_PASSES.iter().filter(|p| p.target() == PassTarget::Offscreen) {
                match step {
                    Pass::Opaque => gpu
                        .opaque
                        .render(&mut pass, self.state.opaque_draw(gpu.opaque.index_count())),
                    Pass::Sky => gpu.sky.render(&mut pass),
                    Pass::Transparent => gpu.transparent.render(&mut pass),
                    Pass::PostProcess | Pass::Present => {}
                }
            }
        }

        let mut encoder = Some(encoder);
        let mut frame = Some(frame);
        for step in FRAME_PASSES.iter().filter(|p| p.target() == PassTarget::Backbuffer) {
            match step {
                Pass::PostProcess => {
                    let target = frame.as_ref().and_then(|f| gpu.backbuffer.target_view(f));
                    if let (Some(encoder), Some(target)) = (encoder.as_mut(), target) {
                        gpu.post.render(device, encoder, &gpu.targets.color_view, target);
                    }
                }
                Pass::Present => {
                    if let Some(encoder) = encoder.take() {
                        gpu.context.queue.submit(std::iter::once(encoder.finish()));
                    }
                    if let Some(frame) = frame.take() {
                        frame.present();
                    }
                }
                Pass::Opaque | Pass::Sky | Pass::Transparent => {}
            }
        }
        Ok(FrameStatus::Presented)
    }

    /// Rebuild size-dependent resources. Zero dimensions are clamped to one.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, RenderError> {
        self.lifecycle.begin_resize()?;
        let gpu = self.gpu.as_mut().ok_or(LifecycleError::ShutDown)?;
        if !self.state.resize(width, height) {
            return Ok(false);
        }
        let extent = self.state.extent();
        let device = &gpu.context.device;
        gpu.backbuffer.resize(device, extent);
        gpu.targets.resize(device, extent);
        gpu.sky.resize(extent);
        info!(width = extent.width, height = extent.height, "renderer resized");
        Ok(true)
    }

    /// Wait for the device to go idle and release every GPU resource.
    pub fn shutdown(&mut self) {
        if !self.lifecycle.shutdown() {
            return;
        }
        if let Some(gpu) = self.gpu.take() {
            let _ = gpu.context.device.poll(wgpu::Maintain::Wait);
            drop(gpu);
        }
        info!("renderer shut down");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl FrameRenderer for Renderer {
    type Output = FrameStatus;
    type Error = RenderError;

    fn update_at(&mut self, camera: &OrbitCamera, now_ms: u64) -> Result<(), RenderError> {
        Renderer::update_at(self, camera, now_ms)
    }

    fn render(&mut self) -> Result<FrameStatus, RenderError> {
        Renderer::render(self)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<bool, RenderError> {
        Renderer::resize(self, width, height)
    }

    fn shutdown(&mut self) {
        Renderer::shutdown(self)
    }
}
