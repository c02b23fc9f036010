//! Frame pipeline shared by every renderer backend.
//!
//! [`FrameState`] turns a camera and a timestamp into everything one frame
//! needs: the culled instance list, the scene constant block and the sky view.
//! Backends upload those and walk [`FRAME_PASSES`] in order.
//!
//! # Invariants
//! - The visible list is rebuilt from scratch on every update.
//! - The opaque draw instance count equals the visible list length, zero included.
//! - Depth state for every pass comes from one [`DepthConvention`](orbitlab_scene::DepthConvention).
//! - Nothing renders after shutdown.

mod config;
mod constants;
mod frame;
mod lifecycle;
mod passes;
mod renderer;

pub use config::{ConfigError, RendererConfig};
pub use constants::{InstanceRecord, SceneConstants, SkyView, sky_radius};
pub use frame::{FrameClock, FrameState, FrameStats, InstancedDraw};
pub use lifecycle::{Lifecycle, LifecycleError, Phase};
pub use passes::{CompareOp, DepthState, FRAME_PASSES, Pass, PassTarget};
pub use renderer::{DebugTextRenderer, FrameRenderer};

pub fn crate_info() -> &'static str {
    concat!("orbitlab-render v", env!("CARGO_PKG_VERSION"))
}
