//! Rigid body physics for tabletop scenes
//!
//! This crate provides the fixed-step simulation that drives the dice:
//! - Collision shapes (spheres, axis-aligned boxes, planes)
//! - Contact tests between them
//! - Rigid bodies with linear and angular velocity
//! - A [`PhysicsWorld`] stepped once per frame by the host

pub mod body;
pub mod collision;
pub mod material;
pub mod shapes;
pub mod world;

pub use body::{BodyKey, BodyType, RigidBody, StaticCollider, MIN_MASS};
pub use collision::{aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, Contact};
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Collider, Plane, Sphere};
pub use world::{PhysicsConfig, PhysicsWorld, FIXED_TIMESTEP};
