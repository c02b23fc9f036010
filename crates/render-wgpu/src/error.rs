use orbitlab_assets::AssetError;
use orbitlab_render::LifecycleError;
use orbitlab_scene::SceneError;

/// How the frame loop should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Startup cannot continue.
    FatalInit,
    /// The device is gone; stop the loop.
    DeviceLost,
    /// The caller broke the renderer's call order.
    Usage,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("surface is not supported by the selected adapter")]
    IncompatibleSurface,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("{label}: {message}")]
    Validation { label: &'static str, message: String },
    #[error("{label} is {width}x{height}, device limit is {max}")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("asset loading failed: {0}")]
    Asset(#[from] AssetError),
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("GPU device lost")]
    DeviceLost,
    #[error("presentation failed: {0}")]
    Present(wgpu::SurfaceError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl RenderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RenderError::NoAdapter
            | RenderError::IncompatibleSurface
            | RenderError::RequestDevice(_)
            | RenderError::CreateSurface(_)
            | RenderError::Validation { .. }
            | RenderError::TextureTooLarge { .. }
            | RenderError::Asset(_)
            | RenderError::Scene(_) => ErrorClass::FatalInit,
            RenderError::DeviceLost | RenderError::Present(_) => ErrorClass::DeviceLost,
            RenderError::Lifecycle(_) => ErrorClass::Usage,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() != ErrorClass::Usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(RenderError::NoAdapter.class(), ErrorClass::FatalInit);
        assert_eq!(RenderError::IncompatibleSurface.class(), ErrorClass::FatalInit);
        assert_eq!(RenderError::DeviceLost.class(), ErrorClass::DeviceLost);
        assert_eq!(
            RenderError::Present(wgpu::SurfaceError::OutOfMemory).class(),
            ErrorClass::DeviceLost
        );
        let usage = RenderError::from(LifecycleError::ShutDown);
        assert_eq!(usage.class(), ErrorClass::Usage);
        assert!(!usage.is_fatal());
        assert_eq!(usage.to_string(), "renderer has been shut down");
    }

    #[test]
    fn validation_error_names_the_module() {
        let err = RenderError::Validation {
            label: "sky_pipeline",
            message: "bad entry point".into(),
        };
        assert_eq!(err.to_string(), "sky_pipeline: bad entry point");
        assert!(err.is_fatal());
    }

    #[test]
    fn oversized_texture_is_fatal_init() {
        let err = RenderError::TextureTooLarge {
            label: "cube_texture".into(),
            width: 40_000,
            height: 1,
            max: 16_384,
        };
        assert_eq!(err.class(), ErrorClass::FatalInit);
        assert_eq!(
            err.to_string(),
            "cube_texture is 40000x1, device limit is 16384"
        );
    }
}
