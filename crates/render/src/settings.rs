use glam::Vec3;
use lantern_common::Color;
use serde::{Deserialize, Serialize};

/// Sky/ground ambient light blended by surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// Parallel light. `direction` points from the scene towards the light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub direction: Vec3,
    pub intensity: f32,
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog amount at `distance` from the eye, 0 (clear) to 1 (fully fogged).
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Environment lighting and clear color, fixed for the lifetime of a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub hemisphere: HemisphereLight,
    pub sun: DirectionalLight,
    pub fog: Fog,
    pub background: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::from_hsl(0.6, 0.6, 0.6),
                ground: Color::from_hsl(0.1, 1.0, 0.4),
                intensity: 0.1,
            },
            sun: DirectionalLight {
                color: Color::from_hsl(0.1, 1.0, 0.95),
                direction: Vec3::new(-1.0, 1.75, 1.0).normalize(),
                intensity: 1.0,
            },
            fog: Fog {
                color: Color::from_hex(0x38cf30),
                near: 0.005,
                far: 150.0,
            },
            background: Color::BLACK,
        }
    }
}
