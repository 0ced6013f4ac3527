//! Scene serialization
//!
//! Provides the [`Scene`] struct for loading/saving scenes from RON files.
//! A scene lists entity templates, static colliders, named routes and the
//! followers and spinners that animate entities by name.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tabletop_physics::{BodyType, PhysicsConfig, PhysicsMaterial, StaticCollider};

use crate::entity::{Appearance, Entity};
use crate::error::CoreError;
use crate::follower::{WaypointFollower, WaypointSequence};
use crate::shapes::Shape;
use crate::spin::{Spinner, DEFAULT_SPIN_RATE};
use crate::{Transform, World};

/// How an entity takes part in physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyTemplate {
    /// Moved by the simulation; the entity follows its body
    Dynamic {
        /// Body mass
        mass: f32,
        /// Surface properties
        #[serde(default)]
        material: PhysicsMaterial,
    },
    /// Fixed in place; other bodies collide with it
    Static {
        /// Surface properties
        #[serde(default)]
        material: PhysicsMaterial,
    },
}

/// A serializable entity template
///
/// Unlike [`Entity`], a template carries the physics body description rather
/// than a live body key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Optional name for this entity (for lookup, and for followers/spinners)
    #[serde(default)]
    pub name: Option<String>,
    /// Tags for categorization (e.g., "die")
    #[serde(default)]
    pub tags: Vec<String>,
    /// The entity's transform in world space
    pub transform: Transform,
    /// The entity's shape
    pub shape: Shape,
    /// The entity's appearance
    #[serde(default)]
    pub appearance: Appearance,
    /// Physics participation, none for purely visual entities
    #[serde(default)]
    pub body: Option<BodyTemplate>,
}

impl EntityTemplate {
    /// Create a new, purely visual entity template
    pub fn new(shape: Shape, transform: Transform, appearance: Appearance) -> Self {
        Self {
            name: None,
            tags: Vec::new(),
            transform,
            shape,
            appearance,
            body: None,
        }
    }

    /// Set the name of this template
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this template
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Give this template a physics body
    pub fn with_body(mut self, body: BodyTemplate) -> Self {
        self.body = Some(body);
        self
    }

    /// Convert this template to an Entity (without its body)
    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::with_transform(self.shape, self.transform, self.appearance.clone());
        if let Some(ref name) = self.name {
            entity = entity.with_name(name.clone());
        }
        entity.with_tags(self.tags.iter().cloned())
    }
}

/// A fixed collider with no visual entity (walls, invisible floors)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderTemplate {
    /// Infinite horizontal floor at height `y`
    Floor {
        /// Floor height
        y: f32,
        /// Surface properties
        #[serde(default)]
        material: PhysicsMaterial,
    },
    /// Axis-aligned box
    Box {
        /// Box center
        center: Vec3,
        /// Half the size along each axis
        half_extents: Vec3,
        /// Surface properties
        #[serde(default)]
        material: PhysicsMaterial,
    },
}

impl ColliderTemplate {
    /// Surface properties of this collider
    pub fn material(&self) -> PhysicsMaterial {
        match *self {
            ColliderTemplate::Floor { material, .. } | ColliderTemplate::Box { material, .. } => material,
        }
    }

    fn to_static_collider(self) -> StaticCollider {
        match self {
            ColliderTemplate::Floor { y, material } => StaticCollider::floor(y, material),
            ColliderTemplate::Box { center, half_extents, material } => {
                StaticCollider::cuboid(center, half_extents, material)
            }
        }
    }
}

/// A named, cyclic list of waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTemplate {
    /// Route name, referenced by followers
    pub name: String,
    /// Waypoints in visiting order
    pub points: Vec<Vec3>,
}

/// Moves a named entity along a named route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerTemplate {
    /// Name of the entity to move
    pub entity: String,
    /// Name of the route to follow
    pub route: String,
    /// Distance moved per frame
    pub speed: f32,
    /// Arrival tolerance, default when absent
    #[serde(default)]
    pub tolerance: Option<f32>,
    /// First waypoint to head for; absent leaves the follower idle until the
    /// host assigns one
    #[serde(default)]
    pub start: Option<usize>,
}

/// Spins a named entity every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinnerTemplate {
    /// Name of the entity to spin
    pub entity: String,
    /// Spin axis
    #[serde(default = "default_spin_axis")]
    pub axis: Vec3,
    /// Radians per frame
    #[serde(default = "default_spin_rate")]
    pub rate: f32,
}

fn default_spin_axis() -> Vec3 {
    Vec3::Y
}

fn default_spin_rate() -> f32 {
    DEFAULT_SPIN_RATE
}

/// A serializable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Gravity for physics, overriding the configured value
    #[serde(default)]
    pub gravity: Option<Vec3>,
    /// Entity templates in this scene
    #[serde(default)]
    pub entities: Vec<EntityTemplate>,
    /// Static colliders without a visual
    #[serde(default)]
    pub colliders: Vec<ColliderTemplate>,
    /// Named routes
    #[serde(default)]
    pub routes: Vec<RouteTemplate>,
    /// Followers, by entity and route name
    #[serde(default)]
    pub followers: Vec<FollowerTemplate>,
    /// Spinners, by entity name
    #[serde(default)]
    pub spinners: Vec<SpinnerTemplate>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: None,
            entities: Vec::new(),
            colliders: Vec::new(),
            routes: Vec::new(),
            followers: Vec::new(),
            spinners: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Set the gravity for this scene
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Add an entity template to this scene
    pub fn add_entity(&mut self, entity: EntityTemplate) {
        self.entities.push(entity);
    }

    /// Add a static collider to this scene
    pub fn add_collider(&mut self, collider: ColliderTemplate) {
        self.colliders.push(collider);
    }

    /// Add a named route
    pub fn add_route(&mut self, name: impl Into<String>, points: Vec<Vec3>) {
        self.routes.push(RouteTemplate { name: name.into(), points });
    }

    /// Add a follower
    pub fn add_follower(&mut self, follower: FollowerTemplate) {
        self.followers.push(follower);
    }

    /// Add a spinner
    pub fn add_spinner(&mut self, spinner: SpinnerTemplate) {
        self.spinners.push(spinner);
    }

    fn needs_physics(&self) -> bool {
        self.gravity.is_some()
            || !self.colliders.is_empty()
            || self.entities.iter().any(|e| e.body.is_some())
    }

    /// Build a live World from this scene with default physics settings
    pub fn instantiate(&self) -> Result<World, SceneError> {
        self.instantiate_with(None)
    }

    /// Build a live World from this scene
    ///
    /// `physics` replaces the default physics settings; the scene's own
    /// gravity, when set, still wins. Physics is enabled whenever settings are
    /// given or the scene has anything physical in it.
    pub fn instantiate_with(&self, physics: Option<PhysicsConfig>) -> Result<World, SceneError> {
        let config = match physics {
            Some(config) => Some(config),
            None if self.needs_physics() => Some(PhysicsConfig::default()),
            None => None,
        };
        let mut world = match config {
            Some(mut config) => {
                if let Some(gravity) = self.gravity {
                    config.gravity = gravity;
                }
                World::with_capacity(self.entities.len()).with_physics(config)
            }
            None => World::with_capacity(self.entities.len()),
        };

        for template in &self.entities {
            spawn_template(&mut world, template)?;
        }

        for (index, collider) in self.colliders.iter().enumerate() {
            check_material(&format!("collider {}", index), &collider.material())?;
        }
        if let Some(physics) = world.physics_mut() {
            for collider in &self.colliders {
                physics.add_static_collider(collider.to_static_collider());
            }
        }

        let mut routes = HashMap::new();
        for route in &self.routes {
            if routes.contains_key(route.name.as_str()) {
                return Err(SceneError::DuplicateRoute(route.name.clone()));
            }
            let sequence = WaypointSequence::new(route.points.clone())
                .map_err(|e| SceneError::Core(route.name.clone(), e))?;
            routes.insert(route.name.as_str(), Arc::new(sequence));
        }

        for entry in &self.followers {
            let key = world
                .find(&entry.entity)
                .ok_or_else(|| SceneError::UnknownEntity(entry.entity.clone()))?;
            let route = routes
                .get(entry.route.as_str())
                .ok_or_else(|| SceneError::UnknownRoute(entry.route.clone()))?;
            let in_context = |e| SceneError::Core(entry.entity.clone(), e);

            let mut follower = WaypointFollower::new(Arc::clone(route), entry.speed).map_err(in_context)?;
            if let Some(tolerance) = entry.tolerance {
                follower = follower.with_arrival_tolerance(tolerance).map_err(in_context)?;
            }
            world.add_follower(key, follower).map_err(in_context)?;
            if let Some(cursor) = entry.start {
                world.assign_first_target(key, cursor).map_err(in_context)?;
            }
        }

        for entry in &self.spinners {
            let key = world
                .find(&entry.entity)
                .ok_or_else(|| SceneError::UnknownEntity(entry.entity.clone()))?;
            let in_context = |e| SceneError::Core(entry.entity.clone(), e);
            let spinner = Spinner::new(entry.axis, entry.rate).map_err(in_context)?;
            world.add_spinner(key, spinner).map_err(in_context)?;
        }

        log::info!(
            "Scene '{}': {} entities, {} colliders, {} followers, {} spinners",
            self.name,
            world.entity_count(),
            self.colliders.len(),
            self.followers.len(),
            self.spinners.len()
        );
        Ok(world)
    }
}

fn spawn_template(world: &mut World, template: &EntityTemplate) -> Result<(), SceneError> {
    let entity = template.to_entity();
    let label = template.name.clone().unwrap_or_else(|| "<unnamed>".to_string());

    let (body_type, mass, material) = match template.body {
        None => {
            world.add_entity(entity);
            return Ok(());
        }
        Some(BodyTemplate::Dynamic { mass, material }) => {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(SceneError::Core(
                    label,
                    CoreError::invalid(format!("body mass must be positive, got {}", mass)),
                ));
            }
            (BodyType::Dynamic, mass, material)
        }
        Some(BodyTemplate::Static { material }) => (BodyType::Static, 0.0, material),
    };
    check_material(&label, &material)?;

    let position = template.transform.position;
    let Some(body) = template.shape.collision_body(position) else {
        // A plane has no volume: a static one becomes a floor, a dynamic one is an error
        if body_type == BodyType::Static {
            if let Some(physics) = world.physics_mut() {
                physics.add_static_collider(StaticCollider::floor(position.y, material));
            }
            world.add_entity(entity);
            return Ok(());
        }
        return Err(SceneError::Core(
            label,
            CoreError::invalid("a plane cannot be a dynamic body"),
        ));
    };

    let mut body = body
        .with_orientation(template.transform.rotation)
        .with_material(material)
        .with_body_type(body_type);
    if body_type == BodyType::Dynamic {
        body = body.with_mass(mass);
    }
    world
        .spawn_tracked(entity, body)
        .map_err(|e| SceneError::Core(label, e))?;
    Ok(())
}

fn check_material(label: &str, material: &PhysicsMaterial) -> Result<(), SceneError> {
    if material.is_valid() {
        return Ok(());
    }
    Err(SceneError::Core(
        label.to_string(),
        CoreError::invalid(format!(
            "friction and restitution must be within [0, 1], got {} and {}",
            material.friction, material.restitution
        )),
    ))
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// Error turning a scene into a live World
#[derive(Debug)]
pub enum SceneError {
    /// Scene file could not be read or parsed
    Load(SceneLoadError),
    /// A follower or spinner names an entity that does not exist
    UnknownEntity(String),
    /// A follower names a route that does not exist
    UnknownRoute(String),
    /// Two routes share a name
    DuplicateRoute(String),
    /// Setting up the named entity or route failed
    Core(String, CoreError),
}

impl From<SceneLoadError> for SceneError {
    fn from(e: SceneLoadError) -> Self {
        SceneError::Load(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Load(e) => write!(f, "{}", e),
            SceneError::UnknownEntity(name) => write!(f, "Unknown entity: '{}'", name),
            SceneError::UnknownRoute(name) => write!(f, "Unknown route: '{}'", name),
            SceneError::DuplicateRoute(name) => write!(f, "Duplicate route name: '{}'", name),
            SceneError::Core(name, e) => write!(f, "'{}': {}", name, e),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Load(e) => Some(e),
            SceneError::Core(_, e) => Some(e),
            _ => None,
        }
    }
}
