//! Core types for tabletop scenes
//!
//! This crate provides the per-frame logic of a small 3D tabletop:
//!
//! - [`Transform`] - Position, rotation, and scale of a visual object
//! - [`PhysicsPose`] / [`VisualPose`] - The two sides of physics-to-visual sync
//! - [`Entity`] - An object on the table with transform, shape, and appearance
//! - [`World`] - Container for entities, physics, followers and spinners
//! - [`WaypointFollower`] - Moves an entity around a cyclic route
//! - [`Spinner`] - Constant per-frame rotation
//! - [`RollGenerator`] / [`top_face`] - Throwing and reading dice
//! - [`Scene`] - Loadable/saveable scene description

mod dice;
mod entity;
mod error;
mod follower;
mod pose;
mod scene;
mod scene_validator;
mod shapes;
mod spin;
mod transform;
mod world;

pub use dice::{roll_impulse, top_face, RollGenerator, RollImpulse, DIE_FACE_TEXTURES, DIE_TAG};
pub use entity::{Appearance, Entity};
pub use error::CoreError;
pub use follower::{
    FollowState, FollowStep, WaypointFollower, WaypointSequence, DEFAULT_ARRIVAL_TOLERANCE,
};
pub use pose::{sync_all, sync_pose, PhysicsPose, VisualPose};
pub use scene::{
    BodyTemplate, ColliderTemplate, EntityTemplate, FollowerTemplate, RouteTemplate, Scene,
    SceneError, SceneLoadError, SceneSaveError, SpinnerTemplate,
};
pub use scene_validator::{SceneValidator, ValidationError};
pub use shapes::Shape;
pub use spin::{Spinner, DEFAULT_SPIN_RATE};
pub use transform::Transform;
pub use world::{Arrival, EntityKey, World};

// Re-export physics types for convenient access through tabletop_core
pub use tabletop_physics::{
    BodyKey, BodyType, PhysicsConfig, PhysicsMaterial, PhysicsWorld, RigidBody, StaticCollider,
    FIXED_TIMESTEP,
};
