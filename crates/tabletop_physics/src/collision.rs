//! Contact tests between spheres, boxes and planes

use glam::Vec3;

use crate::shapes::{Aabb, Plane, Sphere};

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact (on the surface of the first shape)
    pub point: Vec3,
    /// Unit contact normal; each test function documents which way it points
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    /// Create a new contact
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Check if this represents an actual collision (positive penetration)
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }

    /// The same contact seen from the other shape
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Test sphere vs plane collision
///
/// The contact normal is the plane normal.
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    // radius - signed distance covers centers on either side of the plane
    let penetration = sphere.radius - plane.signed_distance(sphere.center);

    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * sphere.radius;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Test box vs plane collision
///
/// The contact normal is the plane normal.
pub fn aabb_vs_plane(aabb: &Aabb, plane: &Plane) -> Option<Contact> {
    // Corner furthest along -normal
    let closest_vertex = aabb.center() - aabb.half_extents() * plane.normal.signum();
    let signed_dist = plane.signed_distance(closest_vertex);

    if signed_dist < 0.0 {
        Some(Contact::new(closest_vertex, plane.normal, -signed_dist))
    } else {
        None
    }
}

/// Test sphere vs box collision
///
/// The contact normal points from the box toward the sphere.
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    let normal = if dist > 0.0001 {
        delta / dist
    } else {
        // Center is inside the box: leave through the nearest face
        let to_min = sphere.center - aabb.min;
        let to_max = aabb.max - sphere.center;
        let candidates = [
            (to_min.x, -Vec3::X),
            (to_max.x, Vec3::X),
            (to_min.y, -Vec3::Y),
            (to_max.y, Vec3::Y),
            (to_min.z, -Vec3::Z),
            (to_max.z, Vec3::Z),
        ];
        candidates
            .iter()
            .fold((f32::INFINITY, Vec3::Y), |best, &(d, n)| if d < best.0 { (d, n) } else { best })
            .1
    };

    Some(Contact::new(closest, normal, sphere.radius - dist))
}

/// Test sphere vs sphere collision
///
/// The contact normal points from `a` toward `b`.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq < min_dist * min_dist && dist_sq > 0.0001 {
        let dist = dist_sq.sqrt();
        let normal = delta / dist;
        let point = a.center + normal * a.radius;
        Some(Contact::new(point, normal, min_dist - dist))
    } else {
        None
    }
}

/// Test box vs box collision
///
/// The contact normal points from `b` toward `a`, along the axis of least
/// overlap.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if a.max.cmplt(b.min).any() || a.min.cmpgt(b.max).any() {
        return None;
    }

    let overlap = (a.max.min(b.max) - a.min.max(b.min)).max(Vec3::ZERO);
    let a_center = a.center();
    let b_center = b.center();

    let axes = [
        (overlap.x, Vec3::X, a_center.x - b_center.x),
        (overlap.y, Vec3::Y, a_center.y - b_center.y),
        (overlap.z, Vec3::Z, a_center.z - b_center.z),
    ];
    let (penetration, axis, side) = axes
        .iter()
        .copied()
        .fold((f32::INFINITY, Vec3::X, 0.0), |best, candidate| {
            if candidate.0 < best.0 {
                candidate
            } else {
                best
            }
        });
    let normal = if side < 0.0 { -axis } else { axis };

    let point = (a.min.max(b.min) + a.max.min(b.max)) * 0.5;
    Some(Contact::new(point, normal, penetration))
}
