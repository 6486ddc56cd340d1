use glam::{Mat4, Vec3};
use lantern_scene::{Geometry, SceneGraph};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 30.0, 70.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            near: 0.2,
            far: 5000.0,
        }
    }
}

impl RenderView {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a view, then produces output.
/// It may update its own caches but never the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen from `view`.
    fn render(&mut self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable listing of every visible node. Used by the CLI
/// and by tests that drive whole frames without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneGraph, view: &RenderView) -> String {
        self.frames += 1;

        let mut out = String::new();
        let _ = writeln!(out, "=== Frame {} ({} nodes) ===", self.frames, scene.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        let mut visible = 0usize;
        for node in scene.visible() {
            visible += 1;
            let p = node.transform.position;
            let kind = match &node.geometry {
                Geometry::Box => "box".to_string(),
                Geometry::Model(model) => format!("model:{}", model.name),
            };
            let _ = writeln!(
                out,
                "  [{}] {} {} pos=({:.2}, {:.2}, {:.2})",
                node.id.short(),
                node.name,
                kind,
                p.x,
                p.y,
                p.z
            );
        }

        tracing::trace!(frame = self.frames, visible, "debug frame rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_assets::{AssetId, ModelData};
    use lantern_common::{Color, Transform};
    use lantern_scene::SceneNode;
    use std::sync::Arc;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("Frame 1"));
        assert!(output.contains("0 nodes"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn debug_renderer_lists_visible_nodes() {
        let mut scene = SceneGraph::new();
        scene.insert(SceneNode::new_box(
            "block",
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            Color::WHITE,
        ));
        let model = Arc::new(ModelData {
            id: AssetId(3),
            name: "duck".into(),
            meshes: Vec::new(),
        });
        let hidden = scene.insert(SceneNode::new_model(model, Transform::default()));
        scene.get_mut(hidden).unwrap().visible = false;

        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("2 nodes"));
        assert!(output.contains("block box pos=(1.00, 2.00, 3.00)"));
        assert!(!output.contains("model:duck"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 60.0);
        assert_eq!(view.near, 0.2);
        assert_eq!(view.far, 5000.0);
        assert_eq!(view.target, Vec3::ZERO);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let view = RenderView::default();
        let clip = view.view_projection(16.0 / 9.0) * view.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
