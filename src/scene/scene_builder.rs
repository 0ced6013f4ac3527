//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for building tabletop worlds in code, the
//! programmatic twin of a RON scene file.

use glam::Vec3;
use tabletop_core::{
    Appearance, CoreError, Entity, PhysicsConfig, PhysicsMaterial, RigidBody, Shape, Spinner,
    StaticCollider, Transform, WaypointFollower, World, DIE_FACE_TEXTURES, DIE_TAG,
};

/// Side length of a standard die
pub const DIE_SIZE: f32 = 1.0;

/// Builder for constructing tabletop worlds
///
/// Steps that can fail (a die without physics, a bad follower) are recorded
/// and the first failure is returned from [`SceneBuilder::build`].
///
/// # Example
/// ```ignore
/// let world = SceneBuilder::new()
///     .with_physics(PhysicsConfig::default())
///     .add_floor(0.0, 30.0, PhysicsMaterial::FELT)
///     .add_arena_walls(5.0, 0.2, 100.0)
///     .add_die("die_1", Vec3::new(-1.0, 5.0, 0.0))
///     .add_die("die_2", Vec3::new(1.0, 5.0, 0.0))
///     .build()?;
/// ```
pub struct SceneBuilder {
    world: World,
    error: Option<CoreError>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    /// Create a new scene builder
    pub fn new() -> Self {
        Self {
            world: World::new(),
            error: None,
        }
    }

    /// Create a scene builder with a pre-allocated world capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            world: World::with_capacity(capacity),
            error: None,
        }
    }

    /// Enable physics
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.world = self.world.with_physics(config);
        self
    }

    fn record(&mut self, result: Result<(), CoreError>) {
        if let Err(e) = result {
            log::warn!("Scene construction step failed: {}", e);
            self.error.get_or_insert(e);
        }
    }

    /// Add a floor at the given Y position
    ///
    /// This adds both a physics floor collider and a visual floor entity.
    pub fn add_floor(mut self, y: f32, size: f32, material: PhysicsMaterial) -> Self {
        if let Some(physics) = self.world.physics_mut() {
            physics.add_static_collider(StaticCollider::floor(y, material));
        }

        self.world.add_entity(
            Entity::with_transform(
                Shape::plane(size),
                Transform::from_position(Vec3::new(0.0, y, 0.0)),
                Appearance::FELT,
            )
            .with_name("floor")
            .with_tag("static"),
        );

        self
    }

    /// Add an invisible box wall
    pub fn add_wall(mut self, center: Vec3, half_extents: Vec3, material: PhysicsMaterial) -> Self {
        if let Some(physics) = self.world.physics_mut() {
            physics.add_static_collider(StaticCollider::cuboid(center, half_extents, material));
        }
        self
    }

    /// Surround the square `[-half_size, half_size]` in X and Z with four walls
    ///
    /// Walls stand on y = 0 and are `height` tall.
    pub fn add_arena_walls(self, half_size: f32, thickness: f32, height: f32) -> Self {
        let offset = half_size + thickness / 2.0;
        let half_height = height / 2.0;
        let along_z = Vec3::new(thickness / 2.0, half_height, offset);
        let along_x = Vec3::new(offset, half_height, thickness / 2.0);

        self.add_wall(Vec3::new(offset, half_height, 0.0), along_z, PhysicsMaterial::WOOD)
            .add_wall(Vec3::new(-offset, half_height, 0.0), along_z, PhysicsMaterial::WOOD)
            .add_wall(Vec3::new(0.0, half_height, offset), along_x, PhysicsMaterial::WOOD)
            .add_wall(Vec3::new(0.0, half_height, -offset), along_x, PhysicsMaterial::WOOD)
    }

    /// Add a die at the given position
    ///
    /// The die is a dynamic body tagged "die", textured one through six.
    pub fn add_die(mut self, name: &str, position: Vec3) -> Self {
        let appearance = DIE_FACE_TEXTURES
            .iter()
            .fold(Appearance::WHITE, |a, texture| a.with_texture(*texture));
        let entity = Entity::with_transform(
            Shape::cube(DIE_SIZE),
            Transform::from_position(position),
            appearance,
        )
        .with_name(name)
        .with_tag(DIE_TAG);
        let body = RigidBody::new_box(position, Vec3::splat(DIE_SIZE / 2.0))
            .with_mass(1.0)
            .with_material(PhysicsMaterial::PLASTIC);

        let result = self.world.spawn_tracked(entity, body).map(|_| ());
        self.record(result);
        self
    }

    /// Add a purely visual token (a board piece)
    pub fn add_token(mut self, name: &str, position: Vec3, radius: f32, appearance: Appearance) -> Self {
        self.world.add_entity(
            Entity::with_transform(Shape::sphere(radius), Transform::from_position(position), appearance)
                .with_name(name)
                .with_tag("token"),
        );
        self
    }

    /// Make a named entity follow `points` at `speed` per frame
    ///
    /// With `start` the follower heads for that waypoint at once; without it
    /// it waits for [`World::assign_first_target`].
    pub fn add_route_follower(
        mut self,
        name: &str,
        points: Vec<Vec3>,
        speed: f32,
        start: Option<usize>,
    ) -> Self {
        let result = self.attach_follower(name, points, speed, start);
        self.record(result);
        self
    }

    fn attach_follower(
        &mut self,
        name: &str,
        points: Vec<Vec3>,
        speed: f32,
        start: Option<usize>,
    ) -> Result<(), CoreError> {
        let key = self
            .world
            .find(name)
            .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))?;
        self.world.add_follower(key, WaypointFollower::from_points(points, speed)?)?;
        if let Some(cursor) = start {
            self.world.assign_first_target(key, cursor)?;
        }
        Ok(())
    }

    /// Add a visual shape that spins every frame (a material showcase piece)
    pub fn add_spinning_shape(
        mut self,
        name: &str,
        shape: Shape,
        position: Vec3,
        appearance: Appearance,
        spinner: Spinner,
    ) -> Self {
        let key = self.world.add_entity(
            Entity::with_transform(shape, Transform::from_position(position), appearance).with_name(name),
        );
        let result = self.world.add_spinner(key, spinner);
        self.record(result);
        self
    }

    /// Build the world, or return the first construction failure
    pub fn build(self) -> Result<World, CoreError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.world),
        }
    }
}
