use crate::SceneConfig;
use lantern_assets::{AssetLoader, PendingAsset};
use lantern_physics::{PhysicsConfig, PhysicsError, PhysicsWorld};
use lantern_render::RenderView;
use lantern_scene::{AssetPlacement, Registry, SceneGraph, attach_model, create_block};
use std::path::PathBuf;
use std::sync::Arc;

/// All state of one running viewer: physics, scene, registry and camera.
///
/// Built by [`crate::FrameDriver::start`] and owned by the driver from then on.
pub struct Session {
    pub(crate) physics: PhysicsWorld,
    pub(crate) scene: SceneGraph,
    pub(crate) registry: Registry,
    pub(crate) view: RenderView,
    pending: Vec<(PendingAsset, AssetPlacement)>,
    frames: u64,
    failed_loads: usize,
}

impl Session {
    /// Create the physics world and the static ground and backdrop.
    pub(crate) fn build(config: &SceneConfig) -> Result<Self, PhysicsError> {
        let _span = tracing::info_span!("session_build").entered();

        let mut physics = PhysicsWorld::new(PhysicsConfig {
            gravity: config.gravity,
        })?;
        let mut scene = SceneGraph::new();
        let mut registry = Registry::new();

        create_block(
            &mut scene,
            &mut physics,
            &mut registry,
            config.ground_position,
            config.ground_size,
            config.ground_color,
        )?;
        create_block(
            &mut scene,
            &mut physics,
            &mut registry,
            config.backdrop_position,
            config.backdrop_size,
            config.backdrop_color,
        )?;

        Ok(Self {
            physics,
            scene,
            registry,
            view: config.initial_view(),
            pending: Vec::new(),
            frames: 0,
            failed_loads: 0,
        })
    }

    /// Start loading a model in the background. It joins the scene on the
    /// first frame after the load finishes.
    pub fn request_asset(&mut self, path: impl Into<PathBuf>, placement: AssetPlacement) {
        self.pending.push((AssetLoader::spawn(path), placement));
    }

    /// Collect finished loads and turn each into a dynamic object.
    ///
    /// Failures are logged and dropped; nothing is added for them.
    pub(crate) fn poll_assets(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let mut still_pending = Vec::with_capacity(self.pending.len());
        for (pending, placement) in std::mem::take(&mut self.pending) {
            match pending.poll() {
                None => still_pending.push((pending, placement)),
                Some(Ok(model)) => {
                    let result = attach_model(
                        &mut self.scene,
                        &mut self.physics,
                        &mut self.registry,
                        Arc::new(model),
                        placement,
                    );
                    if let Err(e) = result {
                        tracing::error!(
                            path = %pending.path().display(),
                            error = %e,
                            "model body rejected"
                        );
                        self.failed_loads += 1;
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(
                        path = %pending.path().display(),
                        error = %e,
                        "asset load failed"
                    );
                    self.failed_loads += 1;
                }
            }
        }
        self.pending = still_pending;
    }

    /// Copy each dynamic body's pose onto its node. Scale is left alone.
    pub(crate) fn sync_poses(&mut self) {
        for object in self.registry.iter().filter(|o| o.dynamic) {
            let pose = self.physics.pose(object.body);
            if !self.scene.set_pose(object.node, pose.position, pose.rotation) {
                tracing::warn!(node = %object.node.short(), "registered node missing from scene");
            }
        }
    }

    pub(crate) fn finish_frame(&mut self) {
        self.frames += 1;
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn view(&self) -> &RenderView {
        &self.view
    }

    pub fn set_view(&mut self, view: RenderView) {
        self.view = view;
    }

    /// Loads that have not reported back yet.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Loads that finished with an error.
    pub fn failed_loads(&self) -> usize {
        self.failed_loads
    }

    /// Frames completed since the session started.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn build_places_ground_and_backdrop() {
        let config = SceneConfig::default();
        let session = Session::build(&config).unwrap();

        assert_eq!(session.registry().len(), 2);
        assert_eq!(session.scene().len(), 2);
        assert_eq!(session.physics().body_count(), 2);
        assert_eq!(session.registry().dynamic_count(), 0);
        assert_eq!(session.view().eye, config.camera_start);
        assert_eq!(session.pending_loads(), 0);

        let positions: Vec<Vec3> = session
            .registry()
            .iter()
            .map(|o| session.scene().get(o.node).unwrap().transform.position)
            .collect();
        assert_eq!(positions, vec![config.ground_position, config.backdrop_position]);
    }

    #[test]
    fn build_fails_on_degenerate_ground() {
        let config = SceneConfig {
            ground_size: Vec3::new(10.0, 0.0, 10.0),
            ..SceneConfig::default()
        };
        assert!(matches!(
            Session::build(&config),
            Err(PhysicsError::InvalidShape(_))
        ));
    }
}
