use crate::PhysicsError;
use crate::descriptor::{BodyDescriptor, ShapeKind};
use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use std::collections::HashMap;

/// Preferred length of one internal substep (seconds).
const TARGET_SUBSTEP: f32 = 1.0 / 60.0;

/// Opaque handle to a body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// World-space position and orientation of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// World construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
        }
    }
}

/// All rapier state for one session plus a cache of last-known poses.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    last_poses: HashMap<BodyHandle, Pose>,
    elapsed: f64,
}

impl PhysicsWorld {
    /// Create an empty world with the configured gravity.
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        if !config.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(config.gravity));
        }
        tracing::debug!(gravity = ?config.gravity, "physics world created");
        Ok(Self {
            gravity: to_vector(config.gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            last_poses: HashMap::new(),
            elapsed: 0.0,
        })
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Total simulated time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Build a body and its collider from `desc` and insert both.
    pub fn add_body(&mut self, desc: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;

        let collider = build_collider(desc)?;
        let iso = Isometry::from_parts(
            Translation3::from(to_vector(desc.position)),
            to_rotation(desc.rotation),
        );
        let body = if desc.is_fixed() {
            RigidBodyBuilder::fixed().pose(iso).build()
        } else {
            RigidBodyBuilder::dynamic().pose(iso).build()
        };

        let rb_handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, rb_handle, &mut self.bodies);

        let handle = BodyHandle(rb_handle);
        self.last_poses.insert(
            handle,
            Pose {
                position: desc.position,
                rotation: desc.rotation.normalize(),
            },
        );
        tracing::debug!(
            ?handle,
            mass = desc.mass,
            position = ?desc.position,
            "rigid body added"
        );
        Ok(handle)
    }

    /// Advance the simulation by exactly `dt` seconds.
    ///
    /// The interval is split into equal substeps of roughly 1/60 s, never more
    /// than `max_substeps`. A zero interval leaves every body untouched.
    pub fn step(&mut self, dt: f32, max_substeps: u32) {
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, "ignoring invalid physics time step");
            return;
        }
        if dt == 0.0 {
            return;
        }

        let substeps = ((dt / TARGET_SUBSTEP).ceil() as u32).clamp(1, max_substeps.max(1));
        let h = dt / substeps as f32;
        self.integration_parameters.dt = h;

        for _ in 0..substeps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &(),
                &(),
            );
        }
        self.elapsed += dt as f64;

        for (rb_handle, body) in self.bodies.iter() {
            if body.is_dynamic() {
                self.last_poses.insert(BodyHandle(rb_handle), pose_of(body));
            }
        }
        tracing::trace!(dt, substeps, "physics stepped");
    }

    /// Current pose of a body, or the last one seen if the body is unavailable.
    pub fn pose(&self, handle: BodyHandle) -> Pose {
        match self.bodies.get(handle.0) {
            Some(body) => pose_of(body),
            None => self.last_poses.get(&handle).copied().unwrap_or_default(),
        }
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Vec3 {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let v = b.linvel();
                Vec3::new(v.x, v.y, v.z)
            })
            .unwrap_or(Vec3::ZERO)
    }

    pub fn is_dynamic(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle.0).is_some_and(|b| b.is_dynamic())
    }
}

fn build_collider(desc: &BodyDescriptor) -> Result<Collider, PhysicsError> {
    let builder = match &desc.shape {
        ShapeKind::Box { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ShapeKind::Sphere { radius } => ColliderBuilder::ball(*radius),
        ShapeKind::TriangleMesh { triangles } => {
            let vertices: Vec<Point<Real>> = triangles
                .iter()
                .flat_map(|t| t.iter().map(|v| Point::new(v.x, v.y, v.z)))
                .collect();
            let indices: Vec<[u32; 3]> = (0..triangles.len() as u32)
                .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                .collect();
            ColliderBuilder::trimesh(vertices, indices)
                .map_err(|e| PhysicsError::InvalidShape(format!("{e:?}")))?
        }
    };

    // The margin lies inside the shape, so contacts resolve at the surface
    // and no skin is added.
    let builder = if desc.is_fixed() {
        builder
    } else {
        builder.mass(desc.mass)
    };
    Ok(builder.build())
}

fn pose_of(body: &RigidBody) -> Pose {
    let t = body.translation();
    let r = body.rotation();
    Pose {
        position: Vec3::new(t.x, t.y, t.z),
        rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default()).unwrap()
    }

    fn ground(world: &mut PhysicsWorld) -> BodyHandle {
        world
            .add_body(&BodyDescriptor::fixed_box(
                Vec3::ZERO,
                Vec3::new(1000.0, 2.0, 1000.0),
            ))
            .unwrap()
    }

    #[test]
    fn rejects_non_finite_gravity() {
        let cfg = PhysicsConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
        };
        assert!(matches!(
            PhysicsWorld::new(cfg),
            Err(PhysicsError::InvalidGravity(_))
        ));
    }

    #[test]
    fn free_fall_strictly_descends() {
        let mut w = world();
        let ball = w
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 10.0, 0.0), 0.5, 1.0))
            .unwrap();

        let mut last_y = w.pose(ball).position.y;
        for _ in 0..60 {
            w.step(DT, 10);
            let y = w.pose(ball).position.y;
            assert!(y < last_y, "expected {y} < {last_y}");
            last_y = y;
        }
        // Roughly 1/2 g t^2 after one second.
        assert!((last_y - 5.0).abs() < 0.3, "fell to {last_y}");
    }

    #[test]
    fn fixed_body_never_moves() {
        let mut w = world();
        let slab = ground(&mut w);
        w.add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 3.0, 0.0), 0.5, 1.0))
            .unwrap();

        let before = w.pose(slab);
        for _ in 0..120 {
            w.step(DT, 10);
        }
        assert_eq!(w.pose(slab), before);
        assert!(!w.is_dynamic(slab));
    }

    #[test]
    fn zero_step_changes_nothing() {
        let mut w = world();
        let ball = w
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(1.0, 10.0, -2.0), 0.5, 1.0))
            .unwrap();
        w.step(DT, 10);

        let before = w.pose(ball);
        let elapsed = w.elapsed();
        w.step(0.0, 10);
        assert_eq!(w.pose(ball), before);
        assert_eq!(w.elapsed(), elapsed);
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let mut w = world();
        let ball = w
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 10.0, 0.0), 0.5, 1.0))
            .unwrap();
        let before = w.pose(ball);
        w.step(-0.5, 10);
        w.step(f32::NAN, 10);
        assert_eq!(w.pose(ball), before);
    }

    #[test]
    fn sphere_comes_to_rest_on_slab() {
        let mut w = world();
        ground(&mut w);
        let ball = w
            .add_body(
                &BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 10.0, 0.0), 0.5, 1.0)
                    .with_margin(0.05),
            )
            .unwrap();

        // Falling 8.5 m from rest takes about 1.3 s; give it three.
        for _ in 0..180 {
            w.step(DT, 10);
        }

        let settled = w.pose(ball).position.y;
        assert!((settled - 1.5).abs() < 0.1, "rested at {settled}");

        for _ in 0..30 {
            w.step(DT, 10);
            let y = w.pose(ball).position.y;
            assert!((y - settled).abs() <= 0.1, "drifted to {y} from {settled}");
            assert!(w.linear_velocity(ball).y.abs() < 0.5);
        }
    }

    #[test]
    fn large_dt_is_split_but_fully_consumed() {
        let mut w = world();
        let ball = w
            .add_body(&BodyDescriptor::dynamic_sphere(Vec3::new(0.0, 100.0, 0.0), 0.5, 1.0))
            .unwrap();
        w.step(1.0, 10);
        assert!((w.elapsed() - 1.0).abs() < 1e-6);
        let v = w.linear_velocity(ball);
        assert!((v.y + 10.0).abs() < 0.1, "velocity after 1 s: {v:?}");
    }

    #[test]
    fn triangle_mesh_body() {
        let mut w = world();
        let shape = ShapeKind::triangle_soup(&[
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::new(0.0, 0.0, 5.0),
        ])
        .unwrap();
        let handle = w
            .add_body(&BodyDescriptor::new(Vec3::ZERO, 0.0, shape))
            .unwrap();
        assert_eq!(w.body_count(), 1);
        assert_eq!(w.pose(handle), Pose::default());
    }

    #[test]
    fn invalid_shape_creates_no_body() {
        let mut w = world();
        let desc = BodyDescriptor::new(
            Vec3::ZERO,
            0.0,
            ShapeKind::TriangleMesh {
                triangles: Vec::new(),
            },
        );
        assert!(matches!(
            w.add_body(&desc),
            Err(PhysicsError::InvalidShape(_))
        ));
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn unknown_handle_falls_back_to_identity() {
        let w = world();
        let pose = w.pose(BodyHandle(RigidBodyHandle::invalid()));
        assert_eq!(pose, Pose::default());
        assert_eq!(
            w.linear_velocity(BodyHandle(RigidBodyHandle::invalid())),
            Vec3::ZERO
        );
    }
}
