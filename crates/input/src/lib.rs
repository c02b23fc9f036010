//! Mouse input mapped to orbit camera deltas.
//!
//! The windowing layer forwards raw pointer events; the frame loop calls
//! [`MouseInput::poll`] once per iteration and applies the result to the camera.
//!
//! # Invariants
//! - Deltas are produced only while a mouse button is held.
//! - Losing focus never fails: the device is re-acquired on a later poll.

pub mod mouse;

pub use mouse::{MouseButton, MouseInput, WHEEL_UNITS_PER_LINE};
