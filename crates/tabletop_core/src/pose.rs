//! Pose capabilities and physics-to-visual synchronization
//!
//! The frame loop only needs to read a pose from the physics side and write
//! one on the visual side. These two traits are that boundary, so the sync
//! and follower logic never depend on a particular body or renderer type.

use glam::{Quat, Vec3};
use tabletop_physics::RigidBody;

/// Read access to a simulated body's pose
pub trait PhysicsPose {
    /// Current position
    fn position(&self) -> Vec3;
    /// Current orientation
    fn orientation(&self) -> Quat;
}

/// Read/write access to a renderable object's pose
pub trait VisualPose {
    /// Current position
    fn position(&self) -> Vec3;
    /// Replace the position
    fn set_position(&mut self, position: Vec3);
    /// Current orientation
    fn orientation(&self) -> Quat;
    /// Replace the orientation
    fn set_orientation(&mut self, orientation: Quat);
}

impl PhysicsPose for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }
}

/// Copy the physics pose onto the visual pose
///
/// Position and orientation are copied exactly; nothing else is written.
#[inline]
pub fn sync_pose<P, V>(physics: &P, visual: &mut V)
where
    P: PhysicsPose + ?Sized,
    V: VisualPose + ?Sized,
{
    visual.set_position(physics.position());
    visual.set_orientation(physics.orientation());
}

/// Sync every (physics, visual) pair
///
/// Pairs are independent; an empty iterator writes nothing.
pub fn sync_all<'a, P, V, I>(pairs: I)
where
    P: PhysicsPose + ?Sized + 'a,
    V: VisualPose + ?Sized + 'a,
    I: IntoIterator<Item = (&'a P, &'a mut V)>,
{
    for (physics, visual) in pairs {
        sync_pose(physics, visual);
    }
}
