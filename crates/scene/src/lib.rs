//! Scene state shared by the frame driver and the renderers.
//!
//! The scene graph holds what is drawn, the physics world holds what is
//! simulated, and the [`Registry`] pairs the two for every object that has
//! both a visual and a physical presence.
//!
//! # Invariants
//! - Every registered body stays in the physics world for the whole session.
//! - Objects are never removed; the registry only grows.
//! - Only the frame driver writes physics poses back onto nodes, at most once per frame.

mod factory;
mod graph;
mod registry;

pub use factory::{AssetPlacement, BLOCK_MARGIN, attach_model, attach_static_mesh, create_block};
pub use graph::{Geometry, SceneGraph, SceneNode};
pub use registry::{ObjectIndex, Registry, SceneObject};
