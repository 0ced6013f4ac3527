//! Entity and Appearance types
//!
//! An Entity is one visual object on the table: a transform, a shape, an
//! appearance, and optionally the physics body that drives it.

use std::collections::HashSet;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tabletop_physics::BodyKey;

use crate::pose::VisualPose;
use crate::shapes::Shape;
use crate::Transform;

/// Base color plus texture names for the host renderer
///
/// Textures are looked up by the host; an empty list means untextured. A die
/// carries six textures in box-face order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Base color as RGBA (each component 0.0-1.0)
    pub base_color: [f32; 4],
    /// Texture names, if any
    #[serde(default)]
    pub textures: Vec<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Appearance {
    /// Create an untextured appearance with the given RGBA color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            base_color: [r, g, b, a],
            textures: Vec::new(),
        }
    }

    /// Create an opaque untextured appearance
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// White, textured with a single image
    pub fn textured(texture: impl Into<String>) -> Self {
        Self::WHITE.with_texture(texture)
    }

    /// Add a texture name
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.textures.push(texture.into());
        self
    }

    /// White
    pub const WHITE: Self = Self { base_color: [1.0, 1.0, 1.0, 1.0], textures: Vec::new() };

    /// Felt green of the dice arena floor
    pub const FELT: Self = Self { base_color: [0.2, 0.45, 0.25, 1.0], textures: Vec::new() };

    /// Token red
    pub const RED: Self = Self { base_color: [1.0, 0.0, 0.0, 1.0], textures: Vec::new() };
}

/// An entity on the table
///
/// Each entity has:
/// - An optional name (for lookup by name)
/// - Tags (for categorization and filtering, e.g. "die")
/// - A transform (position, rotation, scale)
/// - A shape
/// - An appearance
/// - An optional physics body key (links to PhysicsWorld)
#[derive(Clone, Debug)]
pub struct Entity {
    /// Optional name for this entity (for lookup)
    pub name: Option<String>,
    /// Tags for categorization
    pub tags: HashSet<String>,
    /// The entity's transform in world space
    pub transform: Transform,
    /// The entity's shape
    pub shape: Shape,
    /// The entity's appearance
    pub appearance: Appearance,
    /// Optional physics body key
    pub physics_body: Option<BodyKey>,
}

impl Entity {
    /// Create a new entity at the origin
    pub fn new(shape: Shape) -> Self {
        Self::with_transform(shape, Transform::identity(), Appearance::default())
    }

    /// Create a new entity with shape, transform, and appearance
    pub fn with_transform(shape: Shape, transform: Transform, appearance: Appearance) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform,
            shape,
            appearance,
            physics_body: None,
        }
    }

    /// Set the name of this entity (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this entity
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self.tags.insert(tag.into());
        }
        self
    }

    /// Check if this entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether a physics body drives this entity
    pub fn is_tracked(&self) -> bool {
        self.physics_body.is_some()
    }
}

impl VisualPose for Entity {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    fn orientation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.transform.rotation = orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appearance_default() {
        let a = Appearance::default();
        assert_eq!(a.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert!(a.textures.is_empty());
    }

    #[test]
    fn test_appearance_textures_keep_order() {
        let a = Appearance::textured("one.png").with_texture("two.png");
        assert_eq!(a.textures, vec!["one.png".to_string(), "two.png".to_string()]);
    }

    #[test]
    fn test_appearance_missing_textures_deserialize_empty() {
        let a: Appearance = ron::from_str("(base_color: (0.5, 0.5, 0.5, 1.0))").unwrap();
        assert_eq!(a, Appearance::from_rgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_entity_builders() {
        let entity = Entity::new(Shape::cube(1.0))
            .with_name("die_1")
            .with_tags(["die", "dynamic"]);

        assert_eq!(entity.name.as_deref(), Some("die_1"));
        assert!(entity.has_tag("die"));
        assert!(entity.has_tag("dynamic"));
        assert!(!entity.has_tag("token"));
        assert!(!entity.is_tracked());
    }

    #[test]
    fn test_visual_pose_writes_only_pose() {
        let mut entity = Entity::with_transform(
            Shape::sphere(0.5),
            Transform { scale: 2.0, ..Transform::identity() },
            Appearance::RED,
        );

        entity.set_position(Vec3::new(1.0, 2.0, 3.0));
        entity.set_orientation(Quat::from_rotation_y(0.5));

        assert_eq!(entity.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(entity.transform.rotation, Quat::from_rotation_y(0.5));
        assert_eq!(entity.transform.scale, 2.0);
        assert_eq!(entity.appearance, Appearance::RED);
    }
}
