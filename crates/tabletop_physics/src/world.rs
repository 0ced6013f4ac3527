//! Physics world and simulation

use crate::body::{BodyKey, RigidBody, StaticCollider};
use crate::collision::{
    aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, Contact,
};
use crate::material::PhysicsMaterial;
use crate::shapes::Collider;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Timestep the frame loop feeds to [`PhysicsWorld::step`] (seconds)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Below this approach speed a contact does not bounce
const REST_VELOCITY: f32 = 0.5;

/// How strongly contact friction bleeds off spin (per second)
const CONTACT_SPIN_DRAG: f32 = 6.0;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration
    pub gravity: Vec3,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }
}

impl PhysicsConfig {
    /// Create a config with the given gravity and default damping
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Set both damping factors, clamped to [0.0, 1.0]
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.clamp(0.0, 1.0);
        self.angular_damping = angular.clamp(0.0, 1.0);
        self
    }
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    static_colliders: Vec<StaticCollider>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            static_colliders: Vec::new(),
            config,
        }
    }

    /// Add a static collider to the world
    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.static_colliders.push(collider);
    }

    /// Static colliders (floors, walls, boards)
    pub fn static_colliders(&self) -> &[StaticCollider] {
        &self.static_colliders
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        let key = self.bodies.insert(body);
        log::debug!("Registered body {:?}", key);
        key
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    /// Whether the key refers to a registered body
    pub fn contains_body(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    /// Get a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Step the simulation forward by `dt` seconds
    ///
    /// 1. Gravity and damping on dynamic bodies
    /// 2. Velocity and spin integration
    /// 3. Contacts against static colliders
    /// 4. Body-body contacts
    ///
    /// A non-positive or non-finite `dt` leaves the world untouched.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            log::warn!("Ignoring physics step with dt = {}", dt);
            return;
        }

        let linear_keep = (1.0 - self.config.linear_damping).powf(dt);
        let angular_keep = (1.0 - self.config.angular_damping).powf(dt);

        for (_key, body) in &mut self.bodies {
            if body.is_static() {
                continue;
            }
            if body.affected_by_gravity() {
                body.velocity += self.config.gravity * dt;
            }
            body.velocity *= linear_keep;
            body.angular_velocity *= angular_keep;
            body.integrate(dt);
        }

        self.resolve_static_collisions(dt);
        self.resolve_body_collisions(dt);
    }

    /// Contact between a body and a static collider, normal pointing toward the body
    fn check_static_collision(body_collider: &Collider, static_collider: &Collider) -> Option<Contact> {
        match (body_collider, static_collider) {
            (Collider::Sphere(sphere), Collider::Plane(plane)) => sphere_vs_plane(sphere, plane),
            (Collider::Aabb(aabb), Collider::Plane(plane)) => aabb_vs_plane(aabb, plane),
            (Collider::Sphere(sphere), Collider::Aabb(aabb)) => sphere_vs_aabb(sphere, aabb),
            (Collider::Aabb(body_box), Collider::Aabb(static_box)) => aabb_vs_aabb(body_box, static_box),
            (Collider::Sphere(body_sphere), Collider::Sphere(static_sphere)) => {
                sphere_vs_sphere(body_sphere, static_sphere).map(Contact::flipped)
            }
            (Collider::Aabb(aabb), Collider::Sphere(sphere)) => {
                sphere_vs_aabb(sphere, aabb).map(Contact::flipped)
            }
            (Collider::Plane(_), _) => None,
        }
    }

    /// Contact between two bodies, normal pointing from `a` toward `b`
    fn check_body_collision(a: &Collider, b: &Collider) -> Option<Contact> {
        match (a, b) {
            (Collider::Sphere(a), Collider::Sphere(b)) => sphere_vs_sphere(a, b),
            (Collider::Sphere(sphere), Collider::Aabb(aabb)) => {
                sphere_vs_aabb(sphere, aabb).map(Contact::flipped)
            }
            (Collider::Aabb(aabb), Collider::Sphere(sphere)) => sphere_vs_aabb(sphere, aabb),
            (Collider::Aabb(a), Collider::Aabb(b)) => aabb_vs_aabb(a, b).map(Contact::flipped),
            (Collider::Plane(_), _) | (_, Collider::Plane(_)) => None,
        }
    }

    fn resolve_static_collisions(&mut self, dt: f32) {
        for (_key, body) in &mut self.bodies {
            if body.is_static() {
                continue;
            }

            for static_col in &self.static_colliders {
                let Some(contact) = Self::check_static_collision(&body.collider, &static_col.collider) else {
                    continue;
                };
                if !contact.is_colliding() {
                    continue;
                }

                body.apply_correction(contact.normal * contact.penetration);
                let combined = body.material.combine(&static_col.material);
                respond_to_contact(body, contact.normal, combined, dt);
            }
        }
    }

    fn resolve_body_collisions(&mut self, dt: f32) {
        let keys: Vec<BodyKey> = self.bodies.keys().collect();

        for (i, &key_a) in keys.iter().enumerate() {
            for &key_b in &keys[i + 1..] {
                let body_a = &self.bodies[key_a];
                let body_b = &self.bodies[key_b];
                if body_a.is_static() && body_b.is_static() {
                    continue;
                }

                let Some(contact) = Self::check_body_collision(&body_a.collider, &body_b.collider) else {
                    continue;
                };
                if contact.is_colliding() {
                    self.resolve_body_pair(key_a, key_b, &contact, dt);
                }
            }
        }
    }

    /// Push two overlapping bodies apart and apply the velocity response
    fn resolve_body_pair(&mut self, key_a: BodyKey, key_b: BodyKey, contact: &Contact, dt: f32) {
        let static_a = self.bodies[key_a].is_static();
        let static_b = self.bodies[key_b].is_static();

        let (share_a, share_b) = if static_a {
            (0.0, 1.0)
        } else if static_b {
            (1.0, 0.0)
        } else {
            let mass_a = self.bodies[key_a].mass;
            let mass_b = self.bodies[key_b].mass;
            let total = mass_a + mass_b;
            if total.is_finite() && total > 0.0 {
                (mass_b / total, mass_a / total)
            } else {
                (0.5, 0.5)
            }
        };

        let combined = self.bodies[key_a]
            .material
            .combine(&self.bodies[key_b].material);

        if !static_a {
            let body = &mut self.bodies[key_a];
            body.apply_correction(-contact.normal * contact.penetration * share_a);
            respond_to_contact(body, -contact.normal, combined, dt);
        }
        if !static_b {
            let body = &mut self.bodies[key_b];
            body.apply_correction(contact.normal * contact.penetration * share_b);
            respond_to_contact(body, contact.normal, combined, dt);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Velocity response for a body pushed along `normal`
///
/// Removes the approaching normal velocity (bouncing unless it is slow),
/// then applies friction to the tangential velocity and the spin.
fn respond_to_contact(body: &mut RigidBody, normal: Vec3, combined: PhysicsMaterial, dt: f32) {
    let approach = body.velocity.dot(normal);
    if approach < 0.0 {
        let restitution = if -approach > REST_VELOCITY {
            combined.restitution
        } else {
            0.0
        };
        body.velocity -= normal * approach * (1.0 + restitution);

        let normal_part = normal * body.velocity.dot(normal);
        let tangent = body.velocity - normal_part;
        if tangent.length_squared() > 1e-8 {
            body.velocity = normal_part + tangent * (1.0 - combined.friction);
        }
    }

    body.angular_velocity *= (1.0 - combined.friction * CONTACT_SPIN_DRAG * dt).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use approx::assert_relative_eq;

    fn floor_world(gravity: Vec3) -> PhysicsWorld {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(gravity));
        world.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::FELT));
        world
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec3::new(0.0, -9.82, 0.0));
        assert_eq!(config.linear_damping, 0.01);
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_sphere(Vec3::ZERO, 0.5));
        assert_eq!(world.body_count(), 1);
        assert!(world.contains_body(key));

        assert!(world.remove_body(key).is_some());
        assert!(!world.contains_body(key));
        assert!(world.get_body(key).is_none());
    }

    #[test]
    fn test_gravity_pulls_body_down() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5)));

        world.step(FIXED_TIMESTEP);

        let body = world.get_body(key).unwrap();
        assert!(body.velocity.y < 0.0);
        assert!(body.position.y < 5.0);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::new_box(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5)));

        world.step(0.0);
        world.step(-1.0);
        world.step(f32::NAN);

        assert_eq!(world.get_body(key).unwrap().position, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_box_comes_to_rest_on_floor() {
        let mut world = floor_world(PhysicsConfig::default().gravity);
        let key = world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5))
                .with_material(PhysicsMaterial::PLASTIC),
        );

        for _ in 0..600 {
            world.step(FIXED_TIMESTEP);
        }

        let body = world.get_body(key).unwrap();
        assert_relative_eq!(body.position.y, 0.5, epsilon = 0.01);
        assert!(body.is_resting(0.01), "velocity {:?}", body.velocity);
    }

    #[test]
    fn test_fast_impact_bounces() {
        let mut world = floor_world(Vec3::ZERO);
        let key = world.add_body(
            RigidBody::new_sphere(Vec3::new(0.0, 0.55, 0.0), 0.5)
                .with_velocity(Vec3::new(0.0, -6.0, 0.0))
                .with_material(PhysicsMaterial::PLASTIC),
        );

        world.step(FIXED_TIMESTEP);

        assert!(world.get_body(key).unwrap().velocity.y > 0.0);
    }

    #[test]
    fn test_contact_friction_bleeds_spin() {
        let mut world = floor_world(PhysicsConfig::default().gravity);
        let key = world.add_body(
            RigidBody::new_box(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.5))
                .with_angular_velocity(Vec3::new(10.0, 0.0, 0.0)),
        );

        for _ in 0..120 {
            world.step(FIXED_TIMESTEP);
        }

        assert!(world.get_body(key).unwrap().angular_velocity.length() < 1.0);
    }

    #[test]
    fn test_wall_stops_sliding_box() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec3::ZERO));
        world.add_static_collider(StaticCollider::cuboid(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.2, 100.0, 5.0),
            PhysicsMaterial::WOOD,
        ));
        let key = world.add_body(
            RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5)).with_velocity(Vec3::new(20.0, 0.0, 0.0)),
        );

        for _ in 0..300 {
            world.step(FIXED_TIMESTEP);
        }

        let body = world.get_body(key).unwrap();
        assert!(body.position.x <= 4.3 + 1e-3, "escaped to {}", body.position.x);
    }

    #[test]
    fn test_overlapping_bodies_are_separated() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec3::ZERO));
        let a = world.add_body(RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5)));
        let b = world.add_body(RigidBody::new_box(Vec3::new(0.8, 0.0, 0.0), Vec3::splat(0.5)));

        world.step(FIXED_TIMESTEP);

        let gap = world.get_body(b).unwrap().position.x - world.get_body(a).unwrap().position.x;
        assert_relative_eq!(gap, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_massless_bodies_split_evenly() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec3::ZERO));
        let mut a = RigidBody::new_box(Vec3::ZERO, Vec3::splat(0.5));
        let mut b = RigidBody::new_box(Vec3::new(0.8, 0.0, 0.0), Vec3::splat(0.5));
        a.mass = 0.0;
        b.mass = 0.0;
        let a = world.add_body(a);
        let b = world.add_body(b);

        world.step(FIXED_TIMESTEP);

        let (pa, pb) = (world.get_body(a).unwrap().position, world.get_body(b).unwrap().position);
        assert!(pa.is_finite() && pb.is_finite());
        assert_relative_eq!(pb.x - pa.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_static_body_in_slotmap_is_not_moved() {
        let mut world = PhysicsWorld::new();
        let wall = world.add_body(
            RigidBody::new_box(Vec3::ZERO, Vec3::ONE).with_body_type(BodyType::Static),
        );
        let die = world.add_body(RigidBody::new_box(Vec3::new(0.0, 1.4, 0.0), Vec3::splat(0.5)));

        world.step(FIXED_TIMESTEP);

        assert_eq!(world.get_body(wall).unwrap().position, Vec3::ZERO);
        assert!(world.get_body(die).unwrap().position.y >= 1.5 - 1e-4);
    }
}
