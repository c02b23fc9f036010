//! wgpu backend for the orbit scene.
//!
//! Each frame draws the instanced cube ring, the cubemap sky and two blended
//! quads into an offscreen target with reversed depth, then composites that
//! target onto the window (or a headless backbuffer) with a full-screen pass.
//!
//! All per-frame math lives in `orbitlab-render`; this crate only uploads
//! and draws what `FrameState` produces.

mod context;
mod error;
mod mesh;
mod opaque;
mod postproc;
mod renderer;
mod shaders;
mod sky;
mod targets;
mod texture;
mod transparent;

pub use context::GpuContext;
pub use error::{ErrorClass, RenderError};
pub use mesh::{GpuMesh, MeshData, Vertex, cube, quad, uv_sphere};
pub use opaque::OpaquePass;
pub use postproc::PostProc;
pub use renderer::{FrameStatus, Renderer};
pub use sky::Sky;
pub use targets::{DEPTH_FORMAT, RenderTargets, compare_function, depth_stencil};
pub use texture::{COLOR_FORMAT, GpuTexture, linear_sampler, point_sampler};
pub use transparent::{QUAD_COUNT, QuadSpec, Transparent, blend_state, default_quads};
