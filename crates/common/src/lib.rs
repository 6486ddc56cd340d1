//! Shared value types for the lantern viewer.
//!
//! Everything here is plain data: no subsystem owns these types, so the
//! physics, scene and render crates can exchange them freely.

mod color;
mod types;

pub use color::{Color, hsl_to_rgb};
pub use types::{NodeId, Transform};

pub use glam::{Mat4, Quat, Vec3};
