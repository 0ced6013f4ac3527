//! Collision shapes
//!
//! Lightweight primitives used for contact tests. They carry absolute world
//! coordinates and are translated along with their owning body.

use glam::Vec3;

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere at the given center with the given radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

/// An axis-aligned box
///
/// Dice are boxes that tumble; their collider stays axis-aligned while the
/// visual orientation is integrated separately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if a point is inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Get the closest point inside or on the box to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.max(self.min).min(self.max)
    }

    /// Translate the box by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// An infinite plane: `normal · point = distance`
///
/// Points with `normal · point > distance` are above the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal pointing to the positive side
    pub normal: Vec3,
    /// Signed distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal (normalized here) and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            distance,
        }
    }

    /// Create a plane from a point on the plane and a normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    /// Create a horizontal floor plane at the given Y height
    pub fn floor(y: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, y, 0.0), Vec3::Y)
    }

    /// Signed distance from a point to the plane (positive = above)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Collider enum for storing different collision shape types
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    Sphere(Sphere),
    Aabb(Aabb),
    Plane(Plane),
}

impl Collider {
    /// Get the center of the collider
    ///
    /// For planes, returns the point on the plane closest to the origin.
    pub fn center(&self) -> Vec3 {
        match self {
            Collider::Sphere(s) => s.center,
            Collider::Aabb(b) => b.center(),
            Collider::Plane(p) => p.normal * p.distance,
        }
    }

    /// Translate the collider by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        match self {
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(s.center + delta, s.radius)),
            Collider::Aabb(b) => Collider::Aabb(b.translated(delta)),
            Collider::Plane(p) => Collider::Plane(Plane {
                normal: p.normal,
                distance: p.distance + p.normal.dot(delta),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_contains() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        assert!(sphere.contains(Vec3::ZERO));
        assert!(sphere.contains(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!sphere.contains(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_from_center_half_extents() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5));
        assert_eq!(aabb.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(aabb.max, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.half_extents(), Vec3::splat(0.5));
    }

    #[test]
    fn test_aabb_closest_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);

        let inside = Vec3::splat(0.5);
        assert_eq!(aabb.closest_point(inside), inside);
        assert!(aabb.contains(inside));

        let outside = Vec3::new(2.0, 0.5, -1.0);
        assert_eq!(aabb.closest_point(outside), Vec3::new(1.0, 0.5, 0.0));
        assert!(!aabb.contains(outside));
    }

    #[test]
    fn test_plane_signed_distance() {
        let floor = Plane::floor(-0.1);
        assert!((floor.signed_distance(Vec3::new(0.0, 0.9, 0.0)) - 1.0).abs() < 1e-5);
        assert!(floor.signed_distance(Vec3::new(0.0, -1.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_translated_plane_moves_along_normal() {
        let plane = Collider::Plane(Plane::floor(0.0));
        let moved = plane.translated(Vec3::new(3.0, 2.0, 0.0));
        assert_eq!(moved.center(), Vec3::new(0.0, 2.0, 0.0));
    }
}
