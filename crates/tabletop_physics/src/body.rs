//! Rigid body types

use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Collider, Plane, Sphere};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Smallest mass a body may have
pub const MIN_MASS: f32 = 1e-3;

new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed, stale keys resolve to `None`
    /// even if the slot is reused.
    pub struct BodyKey;
}

/// How a body takes part in the simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Moved by gravity, velocity and contacts
    #[default]
    Dynamic,
    /// Never moves; other bodies are pushed out of it
    Static,
}

/// A rigid body with pose, velocities and a collision shape
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world coordinates
    pub position: Vec3,
    /// Orientation in world space
    pub orientation: Quat,
    /// Linear velocity (units per second)
    pub velocity: Vec3,
    /// Angular velocity as a scaled axis (radians per second)
    pub angular_velocity: Vec3,
    /// Mass, used to split contact corrections between bodies
    pub mass: f32,
    /// Surface properties
    pub material: PhysicsMaterial,
    /// The collision shape (absolute world position)
    pub collider: Collider,
    body_type: BodyType,
    affected_by_gravity: bool,
}

impl RigidBody {
    fn with_collider(position: Vec3, collider: Collider) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            material: PhysicsMaterial::default(),
            collider,
            body_type: BodyType::Dynamic,
            affected_by_gravity: true,
        }
    }

    /// Create a dynamic body with a sphere collider
    pub fn new_sphere(position: Vec3, radius: f32) -> Self {
        Self::with_collider(position, Collider::Sphere(Sphere::new(position, radius)))
    }

    /// Create a dynamic body with a box collider
    pub fn new_box(position: Vec3, half_extents: Vec3) -> Self {
        Self::with_collider(
            position,
            Collider::Aabb(Aabb::from_center_half_extents(position, half_extents)),
        )
    }

    /// Create a static box that never moves
    pub fn new_static_box(position: Vec3, half_extents: Vec3) -> Self {
        Self::new_box(position, half_extents).with_body_type(BodyType::Static)
    }

    /// Set the initial orientation
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Set the linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the angular velocity
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set the mass, raised to at least [`MIN_MASS`]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = if mass.is_finite() { mass.max(MIN_MASS) } else { MIN_MASS };
        self
    }

    /// Set the surface material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set whether gravity applies (ignored for static bodies)
    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected && !self.is_static();
        self
    }

    /// Set the body type; static bodies are never affected by gravity
    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        if body_type == BodyType::Static {
            self.affected_by_gravity = false;
            self.velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self
    }

    /// The body type
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Whether this body is static
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Whether gravity applies to this body
    pub fn affected_by_gravity(&self) -> bool {
        self.affected_by_gravity
    }

    /// Move the body and its collider to a new position
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.collider = self.collider.translated(delta);
    }

    /// Replace both velocities at once (used to throw a body)
    pub fn set_velocities(&mut self, linear: Vec3, angular: Vec3) {
        if self.is_static() {
            return;
        }
        self.velocity = linear;
        self.angular_velocity = angular;
    }

    /// Apply a positional correction from contact resolution
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.position += correction;
        self.collider = self.collider.translated(correction);
    }

    /// Advance position and orientation by `dt` using the current velocities
    pub fn integrate(&mut self, dt: f32) {
        let displacement = self.velocity * dt;
        self.apply_correction(displacement);

        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.orientation = (Quat::from_scaled_axis(spin) * self.orientation).normalize();
        }
    }

    /// Whether both velocities are below the given speed
    pub fn is_resting(&self, threshold: f32) -> bool {
        self.velocity.length() < threshold && self.angular_velocity.length() < threshold
    }
}

/// A static collider (floor, wall, board) with its surface material
#[derive(Clone, Debug)]
pub struct StaticCollider {
    /// The collision shape
    pub collider: Collider,
    /// Surface material
    pub material: PhysicsMaterial,
}

impl StaticCollider {
    /// Create a static collider from any shape
    pub fn new(collider: Collider, material: PhysicsMaterial) -> Self {
        Self { collider, material }
    }

    /// Infinite horizontal floor at height `y`
    pub fn floor(y: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(Plane::floor(y)), material)
    }

    /// Infinite plane with the given normal and distance from origin
    pub fn plane(normal: Vec3, distance: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(Plane::new(normal, distance)), material)
    }

    /// Box slab (a board, a wall)
    pub fn cuboid(center: Vec3, half_extents: Vec3, material: PhysicsMaterial) -> Self {
        Self::new(
            Collider::Aabb(Aabb::from_center_half_extents(center, half_extents)),
            material,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_new_box_body() {
        let pos = Vec3::new(-1.0, 5.0, 0.0);
        let body = RigidBody::new_box(pos, Vec3::splat(0.5));

        assert_eq!(body.position, pos);
        assert_eq!(body.orientation, Quat::IDENTITY);
        assert_eq!(body.collider.center(), pos);
        assert!(body.affected_by_gravity());
        assert!(!body.is_static());
    }

    #[test]
    fn test_static_body() {
        let body = RigidBody::new_static_box(Vec3::ZERO, Vec3::ONE).with_gravity(true);
        assert!(body.is_static());
        assert!(!body.affected_by_gravity());
    }

    #[test]
    fn test_with_mass_stays_positive() {
        let body = RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5));
        assert_eq!(body.clone().with_mass(2.5).mass, 2.5);
        assert_eq!(body.clone().with_mass(0.0).mass, MIN_MASS);
        assert_eq!(body.clone().with_mass(-3.0).mass, MIN_MASS);
        assert_eq!(body.with_mass(f32::NAN).mass, MIN_MASS);
    }

    #[test]
    fn test_set_position_moves_collider() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 1.0);
        body.set_position(Vec3::new(5.0, 10.0, 3.0));
        assert_eq!(body.collider.center(), Vec3::new(5.0, 10.0, 3.0));
    }

    #[test]
    fn test_set_velocities_ignored_for_static() {
        let mut body = RigidBody::new_static_box(Vec3::ZERO, Vec3::ONE);
        body.set_velocities(Vec3::X, Vec3::Y);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_integrate_rotates_about_angular_velocity() {
        let mut body = RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5))
            .with_angular_velocity(Vec3::new(0.0, FRAC_PI_2, 0.0));
        body.integrate(1.0);

        let rotated = body.orientation * Vec3::X;
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(rotated.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_integrate_translates() {
        let mut body = RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5))
            .with_velocity(Vec3::new(2.0, 0.0, 0.0));
        body.integrate(0.5);
        assert_eq!(body.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(body.collider.center(), Vec3::new(1.0, 0.0, 0.0));
    }
}
