//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene graph; they never mutate it.
//! - Everything a backend needs besides the scene comes from [`RenderView`]
//!   (per frame) and [`RenderSettings`] (fixed at construction).
//!
//! The debug text renderer stands in for the GPU backend in headless runs
//! and tests. Consumers only see the [`Renderer`] trait.

mod renderer;
mod settings;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use settings::{DirectionalLight, Fog, HemisphereLight, RenderSettings};
