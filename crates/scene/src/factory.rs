use crate::{ObjectIndex, Registry, SceneGraph, SceneNode, SceneObject};
use glam::{Quat, Vec3};
use lantern_assets::ModelData;
use lantern_common::{Color, Transform};
use lantern_physics::{BodyDescriptor, PhysicsError, PhysicsWorld, ShapeKind};
use std::sync::Arc;

/// Collision margin for every body these factories create.
pub const BLOCK_MARGIN: f32 = 0.05;

const MODEL_BODY_RADIUS: f32 = 0.5;
const MODEL_BODY_MASS: f32 = 1.0;

/// Where a loaded model enters the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetPlacement {
    pub position: Vec3,
    /// Uniform scale applied to the visual node.
    pub scale: f32,
}

impl Default for AssetPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 0.0),
            scale: 75.0,
        }
    }
}

/// Add an immovable box: a visible unit cube scaled to `size` plus a fixed
/// box body with the same center and extents.
///
/// The body is created first, so a rejected size leaves the scene untouched.
pub fn create_block(
    scene: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    registry: &mut Registry,
    position: Vec3,
    size: Vec3,
    color: Color,
) -> Result<ObjectIndex, PhysicsError> {
    let desc = BodyDescriptor::fixed_box(position, size).with_margin(BLOCK_MARGIN);
    let body = physics.add_body(&desc)?;

    let node = SceneNode::new_box(
        "block",
        Transform::from_position(position).with_scale(size),
        color,
    )
    .with_shadows(true, true);
    let node = scene.insert(node);

    tracing::info!(?position, ?size, "static block created");
    Ok(registry.register(node, body, false))
}

/// Add a loaded model as a dynamic object driven by a small sphere body.
///
/// The sphere does not follow the model's geometry; it only gives the model
/// something to fall and rest with.
pub fn attach_model(
    scene: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    registry: &mut Registry,
    model: Arc<ModelData>,
    placement: AssetPlacement,
) -> Result<ObjectIndex, PhysicsError> {
    let desc =
        BodyDescriptor::dynamic_sphere(placement.position, MODEL_BODY_RADIUS, MODEL_BODY_MASS)
            .with_rotation(Quat::IDENTITY)
            .with_margin(BLOCK_MARGIN);
    let body = physics.add_body(&desc)?;

    let transform =
        Transform::from_position(placement.position).with_scale(Vec3::splat(placement.scale));
    let name = model.name.clone();
    let node = scene.insert(SceneNode::new_model(model, transform).with_shadows(true, true));

    tracing::info!(model = %name, position = ?placement.position, "model attached");
    Ok(registry.push(SceneObject {
        node,
        body,
        draggable: true,
        dynamic: true,
    }))
}

/// Add a model as fixed collision geometry built from its own triangles.
///
/// Triangle meshes only collide reliably as static bodies, so this is for
/// terrain-like models rather than props.
pub fn attach_static_mesh(
    scene: &mut SceneGraph,
    physics: &mut PhysicsWorld,
    registry: &mut Registry,
    model: Arc<ModelData>,
    placement: AssetPlacement,
) -> Result<ObjectIndex, PhysicsError> {
    let soup = model.triangle_soup(placement.scale);
    let shape = ShapeKind::triangle_soup(&soup)?;
    let desc = BodyDescriptor::new(placement.position, 0.0, shape).with_margin(BLOCK_MARGIN);
    let body = physics.add_body(&desc)?;

    let transform =
        Transform::from_position(placement.position).with_scale(Vec3::splat(placement.scale));
    let triangles = soup.len() / 3;
    let node = scene.insert(SceneNode::new_model(model, transform).with_shadows(false, true));

    tracing::info!(triangles, "static mesh collider created");
    Ok(registry.register(node, body, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Geometry;
    use lantern_assets::{AssetId, MeshData};
    use lantern_physics::{PhysicsConfig, Pose};

    struct Fixture {
        scene: SceneGraph,
        physics: PhysicsWorld,
        registry: Registry,
    }

    fn fixture() -> Fixture {
        Fixture {
            scene: SceneGraph::new(),
            physics: PhysicsWorld::new(PhysicsConfig::default()).unwrap(),
            registry: Registry::new(),
        }
    }

    fn plane_model() -> Arc<ModelData> {
        Arc::new(ModelData {
            id: AssetId(7),
            name: "plane".into(),
            meshes: vec![MeshData {
                name: "plane_0".into(),
                positions: vec![
                    [-1.0, 0.0, -1.0],
                    [1.0, 0.0, -1.0],
                    [1.0, 0.0, 1.0],
                    [-1.0, 0.0, 1.0],
                ],
                normals: vec![[0.0, 1.0, 0.0]; 4],
                indices: vec![0, 2, 1, 0, 3, 2],
                base_color: [1.0; 4],
            }],
        })
    }

    #[test]
    fn block_honors_caller_values() {
        let mut f = fixture();
        let position = Vec3::new(0.0, 0.0, -600.0);
        let size = Vec3::new(10000.0, 10000.0, 2.0);
        let color = Color::from_hex(0x38cf30);
        let index = create_block(
            &mut f.scene,
            &mut f.physics,
            &mut f.registry,
            position,
            size,
            color,
        )
        .unwrap();

        let object = *f.registry.get(index).unwrap();
        assert!(!object.dynamic);
        assert!(!object.draggable);

        let node = f.scene.get(object.node).unwrap();
        assert_eq!(node.geometry, Geometry::Box);
        assert_eq!(node.transform.position, position);
        assert_eq!(node.transform.scale, size);
        assert_eq!(node.material, color);

        assert_eq!(
            f.physics.pose(object.body),
            Pose {
                position,
                rotation: Quat::IDENTITY
            }
        );
        assert!(!f.physics.is_dynamic(object.body));
    }

    #[test]
    fn invalid_block_leaves_scene_unchanged() {
        let mut f = fixture();
        let result = create_block(
            &mut f.scene,
            &mut f.physics,
            &mut f.registry,
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 1.0),
            Color::WHITE,
        );
        assert!(matches!(result, Err(PhysicsError::InvalidShape(_))));
        assert!(f.scene.is_empty());
        assert!(f.registry.is_empty());
        assert_eq!(f.physics.body_count(), 0);
    }

    #[test]
    fn model_gets_dynamic_sphere() {
        let mut f = fixture();
        let placement = AssetPlacement::default();
        let index = attach_model(
            &mut f.scene,
            &mut f.physics,
            &mut f.registry,
            plane_model(),
            placement,
        )
        .unwrap();

        let object = *f.registry.get(index).unwrap();
        assert!(object.dynamic);
        assert!(object.draggable);
        assert!(f.physics.is_dynamic(object.body));
        assert_eq!(f.physics.pose(object.body).position, placement.position);

        let node = f.scene.get(object.node).unwrap();
        assert!(matches!(node.geometry, Geometry::Model(_)));
        assert_eq!(node.transform.scale, Vec3::splat(75.0));
        assert!(node.cast_shadow && node.receive_shadow);
    }

    #[test]
    fn static_mesh_holds_a_falling_sphere() {
        let mut f = fixture();
        attach_static_mesh(
            &mut f.scene,
            &mut f.physics,
            &mut f.registry,
            plane_model(),
            AssetPlacement {
                position: Vec3::ZERO,
                scale: 20.0,
            },
        )
        .unwrap();
        let ball = f
            .physics
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 3.0, 0.0), 0.5, 1.0))
            .unwrap();

        for _ in 0..180 {
            f.physics.step(1.0 / 60.0, 10);
        }
        let y = f.physics.pose(ball).position.y;
        assert!(y > 0.0 && y < 1.0, "sphere ended at {y}");
        assert_eq!(f.registry.dynamic_count(), 0);
    }

    #[test]
    fn static_mesh_rejects_empty_model() {
        let mut f = fixture();
        let empty = Arc::new(ModelData {
            id: AssetId(0),
            name: "empty".into(),
            meshes: Vec::new(),
        });
        let result = attach_static_mesh(
            &mut f.scene,
            &mut f.physics,
            &mut f.registry,
            empty,
            AssetPlacement::default(),
        );
        assert!(matches!(result, Err(PhysicsError::InvalidShape(_))));
        assert!(f.scene.is_empty());
    }
}
