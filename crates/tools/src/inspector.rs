use glam::{Quat, Vec3};
use lantern_assets::{AssetId, ModelData};
use lantern_common::NodeId;
use lantern_kernel::Session;
use lantern_scene::{Geometry, ObjectIndex};

/// Scene inspector for developer tooling.
///
/// Read-only queries against a running session for the overlay and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the session state.
    pub fn summary(session: &Session) -> SceneSummary {
        let summary = SceneSummary {
            frames: session.frames(),
            simulated_seconds: session.physics().elapsed(),
            objects: session.registry().len(),
            dynamic_objects: session.registry().dynamic_count(),
            nodes: session.scene().len(),
            bodies: session.physics().body_count(),
            pending_loads: session.pending_loads(),
            failed_loads: session.failed_loads(),
        };
        tracing::debug!(
            frames = summary.frames,
            objects = summary.objects,
            pending = summary.pending_loads,
            "scene summary"
        );
        summary
    }

    /// Describe one registered object, if the index is valid.
    pub fn inspect_object(session: &Session, index: ObjectIndex) -> Option<ObjectInfo> {
        let Some(object) = session.registry().get(index) else {
            tracing::debug!(index = index.0, "no object at index");
            return None;
        };
        let node = session.scene().get(object.node)?;
        let kind = match &node.geometry {
            Geometry::Box => "box".to_string(),
            Geometry::Model(model) => format!("model {}", model.name),
        };
        Some(ObjectInfo {
            index,
            node: object.node,
            name: node.name.clone(),
            kind,
            position: node.transform.position,
            rotation: node.transform.rotation,
            scale: node.transform.scale,
            dynamic: object.dynamic,
            draggable: object.draggable,
        })
    }

    /// Every registered object in registration order.
    pub fn list_objects(session: &Session) -> Vec<ObjectInfo> {
        (0..session.registry().len())
            .filter_map(|i| Self::inspect_object(session, ObjectIndex(i)))
            .collect()
    }
}

/// Summary of session state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub frames: u64,
    pub simulated_seconds: f64,
    pub objects: usize,
    pub dynamic_objects: usize,
    pub nodes: usize,
    pub bodies: usize,
    pub pending_loads: usize,
    pub failed_loads: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frames={} t={:.2}s objects={} dynamic={} bodies={} pending={} failed={}",
            self.frames,
            self.simulated_seconds,
            self.objects,
            self.dynamic_objects,
            self.bodies,
            self.pending_loads,
            self.failed_loads
        )
    }
}

/// Detailed info about a single scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub index: ObjectIndex,
    pub node: NodeId,
    pub name: String,
    pub kind: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub dynamic: bool,
    pub draggable: bool,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} [{}] {} ({}{}) pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.index.0,
            self.node.short(),
            self.name,
            self.kind,
            if self.dynamic { ", dynamic" } else { "" },
            self.position.x,
            self.position.y,
            self.position.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        )
    }
}

/// Size and extent of an imported model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub name: String,
    pub id: AssetId,
    pub meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub bounds: Option<(Vec3, Vec3)>,
}

impl ModelSummary {
    pub fn of(model: &ModelData) -> Self {
        Self {
            name: model.name.clone(),
            id: model.id,
            meshes: model.meshes.len(),
            vertices: model.vertex_count(),
            triangles: model.triangle_count(),
            bounds: model.bounds(),
        }
    }
}

impl std::fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model: {} (id {:016x})", self.name, self.id.0)?;
        writeln!(
            f,
            "  meshes={} vertices={} triangles={}",
            self.meshes, self.vertices, self.triangles
        )?;
        match self.bounds {
            Some((lo, hi)) => write!(
                f,
                "  bounds=({:.2}, {:.2}, {:.2})..({:.2}, {:.2}, {:.2})",
                lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
            ),
            None => write!(f, "  bounds=empty"),
        }
    }
}
