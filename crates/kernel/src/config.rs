use glam::Vec3;
use lantern_common::Color;
use lantern_render::{RenderSettings, RenderView};
use lantern_scene::AssetPlacement;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything that shapes a session. Every field is optional in YAML.
///
/// ```yaml
/// gravity: [0.0, -10.0, 0.0]
/// asset_path: models/pumpkin.glb
/// asset_scale: 40.0
/// max_substeps: 4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub gravity: Vec3,

    pub ground_position: Vec3,
    pub ground_size: Vec3,
    pub ground_color: Color,

    pub backdrop_position: Vec3,
    pub backdrop_size: Vec3,
    pub backdrop_color: Color,

    /// Model to load at startup. `null` starts an empty scene.
    pub asset_path: Option<PathBuf>,
    pub asset_position: Vec3,
    pub asset_scale: f32,

    pub camera_start: Vec3,
    pub camera_target: Vec3,

    /// Upper bound on physics substeps per frame.
    pub max_substeps: u32,
    /// Longest frame delta fed to physics, in seconds.
    pub max_frame_delta: f32,

    pub render: RenderSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            ground_position: Vec3::ZERO,
            ground_size: Vec3::new(1000.0, 2.0, 1000.0),
            ground_color: Color::BLACK,
            backdrop_position: Vec3::new(0.0, 0.0, -600.0),
            backdrop_size: Vec3::new(10000.0, 10000.0, 2.0),
            backdrop_color: Color::BLACK,
            asset_path: Some(PathBuf::from("scene.gltf")),
            asset_position: Vec3::new(0.0, 10.0, 0.0),
            asset_scale: 75.0,
            camera_start: Vec3::new(0.0, 30.0, 70.0),
            camera_target: Vec3::ZERO,
            max_substeps: 10,
            max_frame_delta: 0.1,
            render: RenderSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        tracing::info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".into()));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta must be positive, got {}",
                self.max_frame_delta
            )));
        }
        if !self.asset_scale.is_finite() || self.asset_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "asset_scale must be positive, got {}",
                self.asset_scale
            )));
        }
        if !self.camera_start.is_finite() || !self.camera_target.is_finite() {
            return Err(ConfigError::Invalid(
                "camera_start and camera_target must be finite".into(),
            ));
        }
        if self.camera_start == self.camera_target {
            return Err(ConfigError::Invalid("camera_start and camera_target must differ".into()));
        }
        Ok(())
    }

    pub fn placement(&self) -> AssetPlacement {
        AssetPlacement {
            position: self.asset_position,
            scale: self.asset_scale,
        }
    }

    pub fn initial_view(&self) -> RenderView {
        RenderView::looking_at(self.camera_start, self.camera_target)
    }
}
