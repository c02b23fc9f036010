use crate::error::RenderError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

/// Instance, adapter, device and queue for one renderer.
///
/// Fields drop top to bottom, the reverse of the order they were acquired.
pub struct GpuContext {
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub adapter: wgpu::Adapter,
    pub instance: wgpu::Instance,
    lost: Arc<AtomicBool>,
}

impl GpuContext {
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Pick an adapter (compatible with `surface` when given) and open a
    /// device on it. The instance table and visible list are read from the
    /// vertex stage, so adapters without vertex storage buffers are skipped.
    pub fn request(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(wgpu::DownlevelFlags::VERTEX_STORAGE) {
            error!(adapter = %info.name, "adapter lacks vertex storage buffers");
            return Err(RenderError::NoAdapter);
        }

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orbitlab_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                debug!(%message, "device destroyed");
            } else {
                error!(?reason, %message, "GPU device lost");
            }
            flag.store(true, Ordering::SeqCst);
        });

        info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            "GPU initialized"
        );

        Ok(Self {
            queue,
            device,
            adapter,
            instance,
            lost,
        })
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    pub fn ensure_alive(&self) -> Result<(), RenderError> {
        if self.is_lost() {
            return Err(RenderError::DeviceLost);
        }
        Ok(())
    }

    /// Run `build` inside a validation error scope so failed shaders,
    /// pipelines and resources come back as errors instead of aborting in the
    /// default handler. Scopes nest; an inner call reports its own failures.
    pub fn validated<T>(
        &self,
        label: &'static str,
        build: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = build(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(RenderError::Validation {
                label,
                message: err.to_string(),
            }),
            None => Ok(value),
        }
    }
}
