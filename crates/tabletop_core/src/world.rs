//! World container for entities
//!
//! The World owns every entity on the table, the optional physics
//! simulation, and the per-entity behaviors (followers and spinners) that run
//! each frame. It is the single context the host passes into the frame loop.

use std::collections::HashMap;

use glam::Vec3;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tabletop_physics::{BodyKey, PhysicsConfig, PhysicsWorld, RigidBody};

use crate::dice::{roll_impulse, top_face, RollGenerator, DIE_TAG};
use crate::error::CoreError;
use crate::follower::{FollowStep, WaypointFollower};
use crate::pose::sync_pose;
use crate::spin::Spinner;
use crate::Entity;

new_key_type! {
    /// Generational key to an entity in the world
    pub struct EntityKey;
}

/// A follower reaching one of its waypoints during [`World::update`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrival {
    /// The entity that arrived
    pub entity: EntityKey,
    /// Cursor of the waypoint reached
    pub reached: usize,
    /// Cursor of the new target
    pub next: usize,
    /// Where the entity now stands (exactly the waypoint)
    pub position: Vec3,
}

/// The table and everything on it
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    name_index: HashMap<String, EntityKey>,
    physics_world: Option<PhysicsWorld>,
    followers: SecondaryMap<EntityKey, WaypointFollower>,
    spinners: SecondaryMap<EntityKey, Spinner>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world without physics
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a world with pre-allocated capacity for entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: SlotMap::with_capacity_and_key(capacity),
            name_index: HashMap::with_capacity(capacity),
            physics_world: None,
            followers: SecondaryMap::new(),
            spinners: SecondaryMap::new(),
        }
    }

    /// Enable physics for this world
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.physics_world = Some(PhysicsWorld::with_config(config));
        self
    }

    /// Get the physics world (if enabled)
    pub fn physics(&self) -> Option<&PhysicsWorld> {
        self.physics_world.as_ref()
    }

    /// Get mutable physics world (if enabled)
    pub fn physics_mut(&mut self) -> Option<&mut PhysicsWorld> {
        self.physics_world.as_mut()
    }

    /// Add an entity to the world, returning its key
    ///
    /// A name already in use is taken over by the new entity.
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        let name = entity.name.clone();
        let key = self.entities.insert(entity);
        if let Some(name) = name {
            if self.name_index.insert(name.clone(), key).is_some() {
                log::warn!("Entity name '{}' reused; lookups now find the newest", name);
            }
        }
        key
    }

    /// Register `body` with physics and add `entity` driven by it
    ///
    /// The entity starts at the body's pose.
    pub fn spawn_tracked(&mut self, entity: Entity, body: RigidBody) -> Result<EntityKey, CoreError> {
        if entity.physics_body.is_some() {
            return Err(CoreError::AlreadyTracked(describe(&entity)));
        }
        let physics = self.physics_world.as_mut().ok_or(CoreError::UnregisteredBody)?;
        let body_key = physics.add_body(body);
        let key = self.add_entity(entity);
        self.pair(key, body_key);
        Ok(key)
    }

    /// Pair an existing entity with a body already in the physics world
    ///
    /// Fails with `UnregisteredBody` if the body is not in this world's
    /// physics, and `AlreadyTracked` if the entity already has a body.
    pub fn attach_body(&mut self, key: EntityKey, body_key: BodyKey) -> Result<(), CoreError> {
        let entity = self
            .entities
            .get(key)
            .ok_or_else(|| CoreError::UnknownEntity(format!("{:?}", key)))?;
        if entity.physics_body.is_some() {
            return Err(CoreError::AlreadyTracked(describe(entity)));
        }
        let registered = self
            .physics_world
            .as_ref()
            .is_some_and(|physics| physics.contains_body(body_key));
        if !registered {
            return Err(CoreError::UnregisteredBody);
        }
        self.pair(key, body_key);
        Ok(())
    }

    fn pair(&mut self, key: EntityKey, body_key: BodyKey) {
        let (Some(entity), Some(physics)) = (self.entities.get_mut(key), self.physics_world.as_ref())
        else {
            return;
        };
        entity.physics_body = Some(body_key);
        if let Some(body) = physics.get_body(body_key) {
            sync_pose(body, entity);
        }
        log::debug!("Entity {} tracks body {:?}", describe(entity), body_key);
    }

    /// Remove an entity along with its body, follower and spinner
    pub fn remove_entity(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        if let Some(name) = &entity.name {
            if self.name_index.get(name) == Some(&key) {
                self.name_index.remove(name);
            }
        }
        self.followers.remove(key);
        self.spinners.remove(key);
        if let (Some(body_key), Some(physics)) = (entity.physics_body, self.physics_world.as_mut()) {
            physics.remove_body(body_key);
        }
        Some(entity)
    }

    /// Get a reference to an entity by key
    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key
    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Look up an entity key by name
    pub fn find(&self, name: &str) -> Option<EntityKey> {
        self.name_index.get(name).copied()
    }

    /// Look up an entity by name
    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        let key = self.find(name)?;
        self.entities.get(key).map(|entity| (key, entity))
    }

    /// Get the number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over keys and entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Iterate over entities carrying `tag`
    pub fn iter_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (EntityKey, &'a Entity)> {
        self.entities.iter().filter(move |(_, entity)| entity.has_tag(tag))
    }

    /// Give an entity a waypoint follower, replacing any previous one
    ///
    /// The follower stays idle until [`World::assign_first_target`].
    pub fn add_follower(&mut self, key: EntityKey, follower: WaypointFollower) -> Result<(), CoreError> {
        if !self.entities.contains_key(key) {
            return Err(CoreError::UnknownEntity(format!("{:?}", key)));
        }
        self.followers.insert(key, follower);
        Ok(())
    }

    /// The follower attached to an entity
    pub fn follower(&self, key: EntityKey) -> Option<&WaypointFollower> {
        self.followers.get(key)
    }

    /// Iterate over all followers
    pub fn followers(&self) -> impl Iterator<Item = (EntityKey, &WaypointFollower)> {
        self.followers.iter()
    }

    /// Start an entity's follower at waypoint `cursor`
    pub fn assign_first_target(&mut self, key: EntityKey, cursor: usize) -> Result<(), CoreError> {
        let follower = self
            .followers
            .get_mut(key)
            .ok_or_else(|| CoreError::UnknownEntity(format!("{:?} has no follower", key)))?;
        follower.assign_first_target(cursor)?;
        log::debug!("Follower {:?} heading for waypoint {}", key, cursor);
        Ok(())
    }

    /// Spin an entity every frame, replacing any previous spinner
    pub fn add_spinner(&mut self, key: EntityKey, spinner: Spinner) -> Result<(), CoreError> {
        if !self.entities.contains_key(key) {
            return Err(CoreError::UnknownEntity(format!("{:?}", key)));
        }
        self.spinners.insert(key, spinner);
        Ok(())
    }

    /// The spinner attached to an entity
    pub fn spinner(&self, key: EntityKey) -> Option<&Spinner> {
        self.spinners.get(key)
    }

    /// Copy each tracked body's pose onto its entity
    ///
    /// Entities whose body has gone missing are left alone.
    pub fn sync_tracked_bodies(&mut self) {
        let Some(physics) = self.physics_world.as_ref() else {
            return;
        };
        for entity in self.entities.values_mut() {
            if let Some(body) = entity.physics_body.and_then(|key| physics.get_body(key)) {
                sync_pose(body, entity);
            }
        }
    }

    /// Throw every tracked die; returns how many were thrown
    pub fn roll_dice(&mut self, rng: &mut RollGenerator) -> usize {
        let Some(physics) = self.physics_world.as_mut() else {
            return 0;
        };
        let mut thrown = 0;
        for entity in self.entities.values().filter(|entity| entity.has_tag(DIE_TAG)) {
            let Some(body) = entity.physics_body.and_then(|key| physics.get_body_mut(key)) else {
                continue;
            };
            let impulse = roll_impulse(rng);
            body.set_velocities(impulse.linear, impulse.angular);
            thrown += 1;
        }
        log::debug!("Rolled {} dice", thrown);
        thrown
    }

    /// Face value showing on top of each die
    pub fn top_faces(&self) -> Vec<(EntityKey, u8)> {
        self.iter_tagged(DIE_TAG)
            .map(|(key, entity)| (key, top_face(entity.transform.rotation)))
            .collect()
    }

    /// Run one frame
    ///
    /// This method:
    /// 1. Steps the physics simulation (if enabled)
    /// 2. Syncs entity transforms from their physics bodies
    /// 3. Advances waypoint followers
    /// 4. Applies spinners
    ///
    /// Returns the waypoint arrivals that happened this frame.
    pub fn update(&mut self, dt: f32) -> Vec<Arrival> {
        if let Some(physics) = self.physics_world.as_mut() {
            physics.step(dt);
        }
        self.sync_tracked_bodies();

        let mut arrivals = Vec::new();
        for (key, follower) in self.followers.iter_mut() {
            let Some(entity) = self.entities.get_mut(key) else {
                continue;
            };
            if let FollowStep::Arrived { reached, next } = follower.advance(entity) {
                log::debug!("{} reached waypoint {}, next {}", describe(entity), reached, next);
                arrivals.push(Arrival {
                    entity: key,
                    reached,
                    next,
                    position: entity.transform.position,
                });
            }
        }

        for (key, spinner) in self.spinners.iter() {
            if let Some(entity) = self.entities.get_mut(key) {
                spinner.apply(entity);
            }
        }

        arrivals
    }

    /// Remove every entity, follower and spinner (physics is kept)
    pub fn clear(&mut self) {
        let keys: Vec<EntityKey> = self.entities.keys().collect();
        for key in keys {
            self.remove_entity(key);
        }
    }
}

fn describe(entity: &Entity) -> String {
    entity.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
}
