//! Surface properties for collision response

use serde::{Deserialize, Serialize};

/// Surface properties for collision response
///
/// Friction controls how quickly sliding and tumbling bodies lose speed on
/// contact; restitution controls how much of the normal velocity bounces back.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = frictionless, 1.0 = grips fully)
    pub friction: f32,
    /// Restitution (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    /// Printed board on a table: grippy, dead
    pub const FELT: Self = Self {
        friction: 0.8,
        restitution: 0.05,
    };

    /// Hard plastic dice: a lively bounce
    pub const PLASTIC: Self = Self {
        friction: 0.4,
        restitution: 0.35,
    };

    /// Wooden box or wall
    pub const WOOD: Self = Self {
        friction: 0.5,
        restitution: 0.2,
    };

    /// Metal token or trim
    pub const METAL: Self = Self {
        friction: 0.3,
        restitution: 0.3,
    };

    /// Create a new material; values are clamped to [0.0, 1.0]
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Both coefficients finite and within [0.0, 1.0]
    ///
    /// Deserialized materials skip the clamp in [`PhysicsMaterial::new`].
    pub fn is_valid(&self) -> bool {
        let in_range = |v: f32| (0.0..=1.0).contains(&v);
        in_range(self.friction) && in_range(self.restitution)
    }

    /// Combine two materials for a contact
    ///
    /// Geometric mean for friction, maximum for restitution.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_clamps_values() {
        let material = PhysicsMaterial::new(1.5, -0.5);
        assert_eq!(material.friction, 1.0);
        assert_eq!(material.restitution, 0.0);
    }

    #[test]
    fn test_is_valid() {
        assert!(PhysicsMaterial::FELT.is_valid());
        assert!(PhysicsMaterial::new(0.0, 1.0).is_valid());
        assert!(!PhysicsMaterial { friction: -1.0, restitution: 0.2 }.is_valid());
        assert!(!PhysicsMaterial { friction: 0.5, restitution: 1.5 }.is_valid());
        assert!(!PhysicsMaterial { friction: f32::NAN, restitution: 0.2 }.is_valid());
    }

    #[test]
    fn test_combine() {
        let combined = PhysicsMaterial::FELT.combine(&PhysicsMaterial::PLASTIC);
        assert_relative_eq!(combined.friction, (0.8_f32 * 0.4).sqrt());
        assert_eq!(combined.restitution, 0.35);
    }

    #[test]
    fn test_combine_is_commutative() {
        let a = PhysicsMaterial::new(0.3, 0.5);
        let b = PhysicsMaterial::new(0.7, 0.2);
        assert_eq!(a.combine(&b), b.combine(&a));
    }
}
