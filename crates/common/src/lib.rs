//! Shared types used by every orbitlab crate.

mod types;

pub use types::{Aabb, Extent};
