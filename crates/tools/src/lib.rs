//! Developer Tooling: frame statistics, scene inspector, model summaries.
//!
//! # Invariants
//! - Tools only read session state.

mod inspector;
mod stats;

pub use inspector::{ModelSummary, ObjectInfo, SceneInspector, SceneSummary};
pub use stats::FrameStats;
