use lantern_common::NodeId;
use lantern_physics::BodyHandle;

/// Position of an object in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIndex(pub usize);

/// A visual node paired with the body that drives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub node: NodeId,
    pub body: BodyHandle,
    /// Stored for pointer interaction. Nothing reads it yet.
    pub draggable: bool,
    /// Mass > 0. Only dynamic objects get their pose synchronized.
    pub dynamic: bool,
}

/// Append-only list of scene objects.
///
/// Registration does not check for duplicates: registering the same pair
/// twice yields two independent entries.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    objects: Vec<SceneObject>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: NodeId, body: BodyHandle, dynamic: bool) -> ObjectIndex {
        self.push(SceneObject {
            node,
            body,
            draggable: false,
            dynamic,
        })
    }

    pub fn push(&mut self, object: SceneObject) -> ObjectIndex {
        let index = ObjectIndex(self.objects.len());
        tracing::debug!(
            index = index.0,
            node = %object.node.short(),
            dynamic = object.dynamic,
            "scene object registered"
        );
        self.objects.push(object);
        index
    }

    pub fn get(&self, index: ObjectIndex) -> Option<&SceneObject> {
        self.objects.get(index.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn for_each(&self, f: impl FnMut(&SceneObject)) {
        self.objects.iter().for_each(f);
    }

    pub fn dynamic_count(&self) -> usize {
        self.objects.iter().filter(|o| o.dynamic).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lantern_physics::{BodyDescriptor, PhysicsConfig, PhysicsWorld};

    fn body() -> BodyHandle {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        world
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::ZERO, 0.5, 1.0))
            .unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let mut registry = Registry::new();
        let nodes: Vec<NodeId> = (0..10).map(|_| NodeId::new()).collect();
        let handle = body();
        for (i, node) in nodes.iter().enumerate() {
            let index = registry.register(*node, handle, i % 2 == 0);
            assert_eq!(index, ObjectIndex(i));
        }

        let seen: Vec<NodeId> = registry.iter().map(|o| o.node).collect();
        assert_eq!(seen, nodes);

        let mut visited = Vec::new();
        registry.for_each(|o| visited.push(o.node));
        assert_eq!(visited, nodes);
        assert_eq!(registry.dynamic_count(), 5);
    }

    #[test]
    fn duplicates_are_independent_entries() {
        let mut registry = Registry::new();
        let node = NodeId::new();
        let handle = body();
        let a = registry.register(node, handle, true);
        let b = registry.register(node, handle, true);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a), registry.get(b));
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ObjectIndex(0)).is_none());
    }
}
