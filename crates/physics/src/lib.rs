//! Physics World Adapter: owns the rigid-body world and hands out opaque body handles.
//!
//! # Invariants
//! - A body, once added, stays in the world for the rest of the session.
//! - Fixed (mass 0) bodies never move.
//! - `step` consumes exactly the time it is given; nothing is carried over
//!   between calls.

mod descriptor;
mod world;

pub use descriptor::{BodyDescriptor, DEFAULT_MARGIN, ShapeKind};
pub use world::{BodyHandle, PhysicsConfig, PhysicsWorld, Pose};

/// Errors from body creation and world setup.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid collision shape: {0}")]
    InvalidShape(String),
    #[error("invalid mass {0}: must be finite and >= 0")]
    InvalidMass(f32),
    #[error("invalid gravity vector {0:?}")]
    InvalidGravity(glam::Vec3),
}
