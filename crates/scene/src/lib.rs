//! Scene model for the orbitlab renderer.
//!
//! Everything here is plain host-side data: no GPU handles, no window. The
//! renderer derives its per-frame state from these types.
//!
//! # Invariants
//! - Camera polar angle stays in `[-π/2, π/2]` and radius stays `>= 1.0`.
//! - Frustum culling is conservative: a box that touches the frustum is never rejected.
//! - Light sampling is a pure function of time.
//! - Instance transforms are fixed after the ring is built.

mod camera;
mod frustum;
mod instances;
mod lights;
mod projection;
mod scene;

pub use camera::{CameraDelta, OrbitCamera, derive_view_matrix, eye_position};
pub use frustum::{Frustum, Plane};
pub use instances::{Instance, InstanceRing, MAX_INSTANCES, VisibleSet};
pub use lights::{ColorGenerator, Light, Lights, LightsError, MAX_LIGHTS, PositionGenerator};
pub use projection::{DepthConvention, Projection};
pub use scene::{Scene, SceneConfig, SceneError};
