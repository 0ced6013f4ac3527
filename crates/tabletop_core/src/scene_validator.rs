//! Scene validation
//!
//! Checks a [`Scene`] for problems before it is instantiated. Instantiation
//! stops at the first bad reference; the [`SceneValidator`] reports all of
//! them at once, plus suspicious values that instantiation would accept.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tabletop_physics::PhysicsMaterial;

use crate::scene::{BodyTemplate, Scene};

/// Largest gravity magnitude considered sane
const MAX_GRAVITY: f32 = 1000.0;

/// Positions beyond this on any axis are flagged
const MAX_COORDINATE: f32 = 10000.0;

/// Validation error found in a scene
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Scene has no entities
    EmptyScene,
    /// Duplicate entity name found
    DuplicateName(String),
    /// Duplicate route name found
    DuplicateRoute(String),
    /// Gravity magnitude above 1000
    UnreasonableGravity(Vec3),
    /// Entity placed at extreme coordinates (any component beyond 10000)
    ExtremePosition(String, Vec3),
    /// A route with no waypoints
    EmptyRoute(String),
    /// A follower or spinner names an entity that does not exist
    UnknownEntity(String),
    /// A follower names a route that does not exist
    UnknownRoute(String),
    /// Friction or restitution outside [0, 1] on an entity body or collider
    BadMaterial(String, PhysicsMaterial),
    /// A follower speed that is zero, negative or not finite
    BadSpeed(String, f32),
    /// A follower starting cursor past the end of its route
    StartOutOfRange {
        /// Follower's entity
        entity: String,
        /// Requested cursor
        start: usize,
        /// Route length
        len: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyScene => write!(f, "Scene has no entities"),
            ValidationError::DuplicateName(name) => {
                write!(f, "Duplicate entity name: '{}'", name)
            }
            ValidationError::DuplicateRoute(name) => write!(f, "Duplicate route name: '{}'", name),
            ValidationError::UnreasonableGravity(g) => {
                write!(f, "Unreasonable gravity value: {} (magnitude > 1000)", g)
            }
            ValidationError::ExtremePosition(name, pos) => {
                write!(f, "Entity '{}' at extreme position {} (component abs > 10000)", name, pos)
            }
            ValidationError::EmptyRoute(name) => write!(f, "Route '{}' has no waypoints", name),
            ValidationError::UnknownEntity(name) => write!(f, "Unknown entity: '{}'", name),
            ValidationError::UnknownRoute(name) => write!(f, "Unknown route: '{}'", name),
            ValidationError::BadMaterial(name, m) => write!(
                f,
                "'{}' has friction {} and restitution {} (both must be within [0, 1])",
                name, m.friction, m.restitution
            ),
            ValidationError::BadSpeed(name, speed) => {
                write!(f, "Follower '{}' has unusable speed {}", name, speed)
            }
            ValidationError::StartOutOfRange { entity, start, len } => write!(
                f,
                "Follower '{}' starts at waypoint {} of a {}-point route",
                entity, start, len
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Scene validator that checks for common errors
///
/// # Example
/// ```ignore
/// for error in SceneValidator::validate(&scene) {
///     log::warn!("{}", error);
/// }
/// ```
pub struct SceneValidator;

impl SceneValidator {
    /// Validate a scene, returning all errors found
    ///
    /// Returns an empty vector if no validation errors are detected.
    pub fn validate(scene: &Scene) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if scene.entities.is_empty() {
            errors.push(ValidationError::EmptyScene);
        }

        let mut names = HashSet::new();
        for entity in &scene.entities {
            if let Some(material) = body_material(entity.body) {
                if !material.is_valid() {
                    let label = entity.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
                    errors.push(ValidationError::BadMaterial(label, material));
                }
            }
            let Some(ref name) = entity.name else {
                continue;
            };
            if !names.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateName(name.clone()));
            }
            let position = entity.transform.position;
            if position.abs().max_element() > MAX_COORDINATE {
                errors.push(ValidationError::ExtremePosition(name.clone(), position));
            }
        }

        if let Some(gravity) = scene.gravity {
            if gravity.length() > MAX_GRAVITY {
                errors.push(ValidationError::UnreasonableGravity(gravity));
            }
        }

        for (index, collider) in scene.colliders.iter().enumerate() {
            let material = collider.material();
            if !material.is_valid() {
                errors.push(ValidationError::BadMaterial(format!("collider {}", index), material));
            }
        }

        // First definition wins, matching what instantiation reports
        let mut routes = HashMap::new();
        for route in &scene.routes {
            if routes.contains_key(route.name.as_str()) {
                errors.push(ValidationError::DuplicateRoute(route.name.clone()));
            } else {
                routes.insert(route.name.as_str(), route.points.len());
            }
            if route.points.is_empty() {
                errors.push(ValidationError::EmptyRoute(route.name.clone()));
            }
        }

        for follower in &scene.followers {
            if !names.contains(follower.entity.as_str()) {
                errors.push(ValidationError::UnknownEntity(follower.entity.clone()));
            }
            if !(follower.speed.is_finite() && follower.speed > 0.0) {
                errors.push(ValidationError::BadSpeed(follower.entity.clone(), follower.speed));
            }
            match routes.get(follower.route.as_str()) {
                None => errors.push(ValidationError::UnknownRoute(follower.route.clone())),
                Some(&len) => {
                    if let Some(start) = follower.start {
                        if len > 0 && start >= len {
                            errors.push(ValidationError::StartOutOfRange {
                                entity: follower.entity.clone(),
                                start,
                                len,
                            });
                        }
                    }
                }
            }
        }

        for spinner in &scene.spinners {
            if !names.contains(spinner.entity.as_str()) {
                errors.push(ValidationError::UnknownEntity(spinner.entity.clone()));
            }
        }

        errors
    }

    /// Validate and return Result (Ok if no errors, Err with all errors)
    pub fn validate_or_error(scene: &Scene) -> Result<(), Vec<ValidationError>> {
        let errors = Self::validate(scene);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn body_material(body: Option<BodyTemplate>) -> Option<PhysicsMaterial> {
    match body? {
        BodyTemplate::Dynamic { material, .. } | BodyTemplate::Static { material } => Some(material),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ColliderTemplate, EntityTemplate, FollowerTemplate, SpinnerTemplate};
    use crate::{Appearance, Shape, Transform};

    fn token(name: &str) -> EntityTemplate {
        EntityTemplate::new(Shape::sphere(0.3), Transform::identity(), Appearance::RED).with_name(name)
    }

    fn follower(entity: &str, route: &str, speed: f32, start: Option<usize>) -> FollowerTemplate {
        FollowerTemplate {
            entity: entity.to_string(),
            route: route.to_string(),
            speed,
            tolerance: None,
            start,
        }
    }

    fn make_valid_scene() -> Scene {
        let mut scene = Scene::new("Valid Scene").with_gravity(Vec3::new(0.0, -9.82, 0.0));
        scene.add_entity(token("token"));
        scene.add_route("loop", vec![Vec3::ZERO, Vec3::X]);
        scene.add_follower(follower("token", "loop", 0.1, Some(1)));
        scene
    }

    #[test]
    fn test_valid_scene_returns_no_errors() {
        let errors = SceneValidator::validate(&make_valid_scene());
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
        assert!(SceneValidator::validate_or_error(&make_valid_scene()).is_ok());
    }

    #[test]
    fn test_empty_scene_error() {
        let errors = SceneValidator::validate(&Scene::new("Empty"));
        assert_eq!(errors, vec![ValidationError::EmptyScene]);
    }

    #[test]
    fn test_duplicate_names_detected() {
        let mut scene = Scene::new("Dupes");
        scene.add_entity(token("die"));
        scene.add_entity(token("die"));
        scene.add_entity(EntityTemplate::new(Shape::cube(1.0), Transform::identity(), Appearance::WHITE));
        scene.add_entity(EntityTemplate::new(Shape::cube(1.0), Transform::identity(), Appearance::WHITE));

        let errors = SceneValidator::validate(&scene);
        assert_eq!(errors, vec![ValidationError::DuplicateName("die".to_string())]);
    }

    #[test]
    fn test_unreasonable_gravity_detected() {
        let mut scene = Scene::new("High Gravity").with_gravity(Vec3::new(0.0, -5000.0, 0.0));
        scene.add_entity(token("a"));

        let errors = SceneValidator::validate(&scene);
        assert!(
            errors.contains(&ValidationError::UnreasonableGravity(Vec3::new(0.0, -5000.0, 0.0))),
            "Expected UnreasonableGravity, got: {:?}",
            errors
        );
    }

    #[test]
    fn test_extreme_position_detected() {
        let mut scene = Scene::new("Far Away");
        let mut far = token("far");
        far.transform.position = Vec3::new(0.0, 0.0, -99999.0);
        scene.add_entity(far);

        let errors = SceneValidator::validate(&scene);
        assert!(errors.contains(&ValidationError::ExtremePosition(
            "far".to_string(),
            Vec3::new(0.0, 0.0, -99999.0)
        )));
    }

    #[test]
    fn test_follower_problems_all_reported() {
        let mut scene = make_valid_scene();
        scene.add_route("empty", Vec::new());
        scene.add_follower(follower("ghost", "nowhere", -1.0, None));
        scene.add_follower(follower("token", "loop", 1.0, Some(2)));
        scene.add_spinner(SpinnerTemplate {
            entity: "phantom".to_string(),
            axis: Vec3::Y,
            rate: 0.01,
        });

        let errors = SceneValidator::validate(&scene);

        assert!(errors.contains(&ValidationError::EmptyRoute("empty".to_string())));
        assert!(errors.contains(&ValidationError::UnknownEntity("ghost".to_string())));
        assert!(errors.contains(&ValidationError::UnknownRoute("nowhere".to_string())));
        assert!(errors.contains(&ValidationError::BadSpeed("ghost".to_string(), -1.0)));
        assert!(errors.contains(&ValidationError::StartOutOfRange {
            entity: "token".to_string(),
            start: 2,
            len: 2
        }));
        assert!(errors.contains(&ValidationError::UnknownEntity("phantom".to_string())));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_duplicate_route_detected() {
        let mut scene = make_valid_scene();
        scene.add_route("loop", vec![Vec3::ZERO]);

        let result = SceneValidator::validate_or_error(&scene);
        assert_eq!(result, Err(vec![ValidationError::DuplicateRoute("loop".to_string())]));
    }

    #[test]
    fn test_bad_materials_detected() {
        let sticky = PhysicsMaterial { friction: -1.0, restitution: 0.35 };
        let springy = PhysicsMaterial { friction: 0.5, restitution: 1.5 };
        let mut scene = make_valid_scene();
        scene.add_entity(
            EntityTemplate::new(Shape::cube(1.0), Transform::identity(), Appearance::WHITE)
                .with_name("die")
                .with_body(BodyTemplate::Dynamic { mass: 1.0, material: sticky }),
        );
        scene.add_collider(ColliderTemplate::Floor { y: 0.0, material: PhysicsMaterial::FELT });
        scene.add_collider(ColliderTemplate::Box {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
            material: springy,
        });

        let result = SceneValidator::validate_or_error(&scene);
        assert_eq!(
            result,
            Err(vec![
                ValidationError::BadMaterial("die".to_string(), sticky),
                ValidationError::BadMaterial("collider 1".to_string(), springy),
            ])
        );
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(format!("{}", ValidationError::EmptyScene), "Scene has no entities");
        assert_eq!(
            format!("{}", ValidationError::DuplicateName("foo".to_string())),
            "Duplicate entity name: 'foo'"
        );
        assert!(format!("{}", ValidationError::BadSpeed("t".to_string(), 0.0)).contains("speed 0"));
        let out_of_range = ValidationError::StartOutOfRange {
            entity: "t".to_string(),
            start: 4,
            len: 2,
        };
        assert!(out_of_range.to_string().contains("waypoint 4 of a 2-point route"));
    }
}
