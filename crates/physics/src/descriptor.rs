use crate::PhysicsError;
use glam::{Quat, Vec3};

/// Collision margin applied when a descriptor does not override it.
pub const DEFAULT_MARGIN: f32 = 0.05;

/// Supported collision shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned box in body space (meters).
    Box { half_extents: Vec3 },
    /// Ball (meters).
    Sphere { radius: f32 },
    /// Triangle soup in body space.
    TriangleMesh { triangles: Vec<[Vec3; 3]> },
}

impl ShapeKind {
    /// Build a triangle mesh from a flat position list, three vertices per triangle.
    pub fn triangle_soup(positions: &[Vec3]) -> Result<Self, PhysicsError> {
        if positions.is_empty() {
            return Err(PhysicsError::InvalidShape("triangle mesh has no vertices".into()));
        }
        if positions.len() % 3 != 0 {
            return Err(PhysicsError::InvalidShape(format!(
                "triangle mesh vertex count {} is not a multiple of 3",
                positions.len()
            )));
        }
        let triangles = positions
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Ok(Self::TriangleMesh { triangles })
    }

    /// Reject shapes the engine would build into something degenerate.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match self {
            ShapeKind::Box { half_extents } => {
                if !half_extents.is_finite() || half_extents.min_element() <= 0.0 {
                    return Err(PhysicsError::InvalidShape(format!(
                        "box half-extents must be positive, got {half_extents:?}"
                    )));
                }
            }
            ShapeKind::Sphere { radius } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(PhysicsError::InvalidShape(format!(
                        "sphere radius must be positive, got {radius}"
                    )));
                }
            }
            ShapeKind::TriangleMesh { triangles } => {
                if triangles.is_empty() {
                    return Err(PhysicsError::InvalidShape("triangle mesh is empty".into()));
                }
                if let Some(i) = triangles
                    .iter()
                    .position(|t| t.iter().any(|v| !v.is_finite()))
                {
                    return Err(PhysicsError::InvalidShape(format!(
                        "triangle {i} has a non-finite vertex"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Everything needed to create one rigid body. Not retained after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub position: Vec3,
    pub rotation: Quat,
    /// Zero makes the body fixed; positive makes it dynamic.
    pub mass: f32,
    /// Collision margin, measured inward from the shape surface. Resting
    /// contact happens at the surface itself.
    pub margin: f32,
    pub shape: ShapeKind,
}

impl BodyDescriptor {
    pub fn new(position: Vec3, mass: f32, shape: ShapeKind) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            mass,
            margin: DEFAULT_MARGIN,
            shape,
        }
    }

    /// Immovable box with the given full size.
    pub fn fixed_box(position: Vec3, size: Vec3) -> Self {
        Self::new(
            position,
            0.0,
            ShapeKind::Box {
                half_extents: size * 0.5,
            },
        )
    }

    pub fn dynamic_sphere(position: Vec3, radius: f32, mass: f32) -> Self {
        Self::new(position, mass, ShapeKind::Sphere { radius })
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.mass == 0.0
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(PhysicsError::InvalidShape(format!(
                "non-finite pose: position={:?} rotation={:?}",
                self.position, self.rotation
            )));
        }
        self.shape.validate()
    }
}
