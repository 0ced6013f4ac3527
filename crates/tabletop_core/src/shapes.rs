//! Serializable visual shapes
//!
//! A [`Shape`] describes the mesh the host should draw for an entity and is
//! also the source of the matching collision shape, so geometry and collider
//! never disagree about size.
//!
//! Shapes are described in local space, centered at the origin; the entity
//! transform places them in the world.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tabletop_physics::RigidBody;

/// Serializable shape description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// A cube (a die)
    Cube {
        /// Full side length
        size: f32,
    },
    /// A sphere (a globe, a token)
    Sphere {
        /// Radius
        radius: f32,
    },
    /// A flat square lying in the XZ plane (a board, a floor)
    Plane {
        /// Full side length
        size: f32,
    },
}

impl Shape {
    /// Create a cube shape
    pub fn cube(size: f32) -> Self {
        Shape::Cube { size }
    }

    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }

    /// Create a plane shape
    pub fn plane(size: f32) -> Self {
        Shape::Plane { size }
    }

    /// Half the size along each axis
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Shape::Cube { size } => Vec3::splat(size * 0.5),
            Shape::Sphere { radius } => Vec3::splat(radius),
            Shape::Plane { size } => Vec3::new(size * 0.5, 0.0, size * 0.5),
        }
    }

    /// A dynamic body with the matching collider at `position`
    ///
    /// Planes have no volume and get no body; use a static collider instead.
    pub fn collision_body(&self, position: Vec3) -> Option<RigidBody> {
        match *self {
            Shape::Cube { .. } => Some(RigidBody::new_box(position, self.half_extents())),
            Shape::Sphere { radius } => Some(RigidBody::new_sphere(position, radius)),
            Shape::Plane { .. } => None,
        }
    }
}
