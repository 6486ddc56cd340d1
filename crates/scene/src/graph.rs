use glam::{Quat, Vec3};
use lantern_assets::ModelData;
use lantern_common::{Color, NodeId, Transform};
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Unit cube centered on the origin, sized by the node's scale.
    Box,
    /// Imported meshes, shared between nodes that use the same model.
    Model(Arc<ModelData>),
}

/// One drawable node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub geometry: Geometry,
    /// Base color. Model meshes multiply their own base color with it.
    pub material: Color,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
}

impl SceneNode {
    pub fn new_box(name: impl Into<String>, transform: Transform, material: Color) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform,
            geometry: Geometry::Box,
            material,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
        }
    }

    pub fn new_model(model: Arc<ModelData>, transform: Transform) -> Self {
        Self {
            id: NodeId::new(),
            name: model.name.clone(),
            transform,
            geometry: Geometry::Model(model),
            material: Color::WHITE,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
        }
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

/// All visual nodes, keyed by id.
///
/// BTreeMap keeps iteration stable between frames for a given scene.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Nodes that should be drawn this frame.
    pub fn visible(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values().filter(|n| n.visible)
    }

    /// Overwrite position and rotation, leaving scale untouched.
    /// Returns false for an unknown node.
    pub fn set_pose(&mut self, id: NodeId, position: Vec3, rotation: Quat) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform.position = position;
                node.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut scene = SceneGraph::new();
        let id = scene.insert(SceneNode::new_box("ground", Transform::default(), Color::WHITE));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(id).unwrap().name, "ground");
        assert!(scene.get(NodeId::new()).is_none());
    }

    #[test]
    fn set_pose_keeps_scale() {
        let mut scene = SceneGraph::new();
        let scale = Vec3::new(1000.0, 2.0, 1000.0);
        let id = scene.insert(SceneNode::new_box(
            "slab",
            Transform::default().with_scale(scale),
            Color::WHITE,
        ));

        let rot = Quat::from_rotation_y(1.0);
        assert!(scene.set_pose(id, Vec3::new(1.0, 2.0, 3.0), rot));
        let t = scene.get(id).unwrap().transform;
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, rot);
        assert_eq!(t.scale, scale);

        assert!(!scene.set_pose(NodeId::new(), Vec3::ZERO, Quat::IDENTITY));
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut scene = SceneGraph::new();
        let id = scene.insert(SceneNode::new_box("a", Transform::default(), Color::WHITE));
        scene.insert(SceneNode::new_box("b", Transform::default(), Color::WHITE));
        scene.get_mut(id).unwrap().visible = false;
        assert_eq!(scene.visible().count(), 1);
        assert_eq!(scene.iter().count(), 2);
    }
}
