use crate::{ConfigError, FrameClock, SceneConfig, Session};
use lantern_physics::PhysicsError;
use lantern_render::Renderer;

/// Errors from the frame driver's lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("session initialization failed: {0}")]
    Initialization(#[from] PhysicsError),
    #[error("scene config rejected: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("frame driver is not running")]
    NotRunning,
    #[error("frame driver is already running")]
    AlreadyRunning,
}

/// Lifecycle of a [`FrameDriver`]. There is no terminal state; the host
/// simply stops calling [`FrameDriver::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Running,
}

/// Runs one tick per displayed frame: collect finished asset loads, step
/// physics by the elapsed time, copy dynamic poses onto their nodes, render.
pub struct FrameDriver {
    config: SceneConfig,
    session: Option<Session>,
    clock: FrameClock,
}

impl FrameDriver {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            session: None,
            clock: FrameClock::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        if self.session.is_some() {
            DriverState::Running
        } else {
            DriverState::Uninitialized
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Validate the config, build the session, place the static colliders
    /// and start loading the configured asset. On error the driver stays
    /// uninitialized.
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.session.is_some() {
            return Err(DriverError::AlreadyRunning);
        }

        self.config.validate()?;
        let mut session = Session::build(&self.config)?;
        if let Some(path) = &self.config.asset_path {
            session.request_asset(path.clone(), self.config.placement());
        }

        tracing::info!(
            objects = session.registry().len(),
            pending = session.pending_loads(),
            "frame driver running"
        );
        self.session = Some(session);
        self.clock.reset();
        Ok(())
    }

    /// Run one tick using the wall-clock time since the previous frame.
    pub fn frame<R: Renderer>(&mut self, renderer: &mut R) -> Result<R::Output, DriverError> {
        if self.session.is_none() {
            return Err(DriverError::NotRunning);
        }
        let elapsed = self.clock.tick();
        self.frame_with_delta(elapsed, renderer)
    }

    /// Run one tick with an explicit elapsed time in seconds.
    pub fn frame_with_delta<R: Renderer>(
        &mut self,
        elapsed: f32,
        renderer: &mut R,
    ) -> Result<R::Output, DriverError> {
        let dt = clamp_delta(elapsed, self.config.max_frame_delta);
        let max_substeps = self.config.max_substeps;
        let session = self.session.as_mut().ok_or(DriverError::NotRunning)?;

        let _span = tracing::trace_span!("frame", n = session.frames()).entered();

        session.poll_assets();
        session.physics.step(dt, max_substeps);
        session.sync_poses();
        session.finish_frame();

        Ok(renderer.render(&session.scene, &session.view))
    }
}

/// Bound a frame delta to `[0, max]`. Invalid input becomes zero.
fn clamp_delta(elapsed: f32, max: f32) -> f32 {
    if !elapsed.is_finite() || elapsed < 0.0 {
        tracing::warn!(elapsed, "discarding invalid frame delta");
        return 0.0;
    }
    if elapsed > max {
        tracing::debug!(elapsed, max, "frame delta clamped");
        return max;
    }
    elapsed
}
