//! wgpu render backend for the lantern viewer.
//!
//! Draws `Box` nodes as instanced unit cubes and `Model` nodes from GPU
//! buffers cached per asset id, with hemisphere + directional lighting and
//! linear fog. The orbit camera produces the [`lantern_render::RenderView`]
//! handed to the frame driver.
//!
//! # Invariants
//! - The renderer never mutates the scene graph.
//! - Camera motion is not part of the simulation.
//! - A model is uploaded once per asset id, however many nodes show it.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{DrawStats, GpuFrame, WgpuRenderer};
