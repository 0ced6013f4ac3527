//! Visual transform (position, rotation, scale)

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::pose::VisualPose;

/// Position, rotation and uniform scale of a visual object
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a unit quaternion
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
    /// Uniform scale factor
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

fn unit_scale() -> f32 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform at the origin
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    /// Transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.position
    }

    /// Translate by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate by a quaternion applied in world space
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }
}

impl VisualPose for Transform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn orientation(&self) -> Quat {
        self.rotation
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.rotation = orientation;
    }
}
