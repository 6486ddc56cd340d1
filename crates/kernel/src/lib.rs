//! Frame kernel: owns the session and runs one simulation/render tick per frame.
//!
//! # Invariants
//! - All scene, registry and physics mutation happens on the thread that calls
//!   [`FrameDriver::frame`]; the asset loader only hands results back.
//! - Each frame steps physics exactly once, by the clamped wall-clock delta.
//! - Dynamic objects are synchronized in registration order before rendering;
//!   fixed objects are never written back.

mod clock;
mod config;
mod driver;
mod session;

pub use clock::FrameClock;
pub use config::{ConfigError, SceneConfig};
pub use driver::{DriverError, DriverState, FrameDriver};
pub use session::Session;
