use glam::Vec3;
use lantern_render::RenderView;

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 2000.0;

/// Camera orbiting a target point: drag to rotate, wheel to zoom.
/// Camera motion is purely visual and never touches the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Radians around +Y, zero looking down -Z.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_view(&RenderView::default())
    }
}

impl OrbitCamera {
    /// Orbit that reproduces the eye and target of `view`.
    pub fn from_view(view: &RenderView) -> Self {
        let offset = view.eye - view.target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let (yaw, pitch) = if offset.length_squared() > 0.0 {
            let dir = offset.normalize();
            (dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin())
        } else {
            (0.0, 0.0)
        };
        Self {
            target: view.target,
            distance,
            yaw,
            pitch,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + dir * self.distance
    }

    /// Rotate by a pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_sensitivity;
        self.pitch += dy * self.rotate_sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Zoom by wheel lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - self.zoom_sensitivity).powf(lines);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply this orbit to `base`, keeping its projection settings.
    pub fn apply(&self, base: &RenderView) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            ..*base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_start_view() {
        let view = RenderView::looking_at(Vec3::new(0.0, 30.0, 70.0), Vec3::ZERO);
        let cam = OrbitCamera::from_view(&view);
        assert!((cam.eye() - view.eye).length() < 1e-3);
        assert_eq!(cam.apply(&view).fov_degrees, view.fov_degrees);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut cam = OrbitCamera::default();
        let d = (cam.eye() - cam.target).length();
        cam.rotate(250.0, -40.0);
        assert!(((cam.eye() - cam.target).length() - d).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians());
        assert!(cam.eye().is_finite());
    }

    #[test]
    fn zoom_moves_closer_and_stays_bounded() {
        let mut cam = OrbitCamera::default();
        let d = cam.distance;
        cam.zoom(1.0);
        assert!(cam.distance < d);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
    }
}
