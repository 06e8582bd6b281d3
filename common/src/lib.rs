//! Common utilities for the trapped-ion visualization
//!
//! Shared graphics setup, the orbital camera, and the screen/world math
//! used for picking and for placing overlays.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
