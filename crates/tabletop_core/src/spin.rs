//! Constant per-frame rotation for showcase objects

use glam::{Quat, Vec3};

use crate::error::CoreError;
use crate::pose::VisualPose;

/// Turn used by the material showcase: 0.01 rad per frame about +Y
pub const DEFAULT_SPIN_RATE: f32 = 0.01;

/// Rotates a visual object by a fixed angle every frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spinner {
    axis: Vec3,
    radians_per_frame: f32,
    step: Quat,
}

impl Spinner {
    /// Create a spinner; the axis must be finite and non-zero
    pub fn new(axis: Vec3, radians_per_frame: f32) -> Result<Self, CoreError> {
        let Some(axis) = axis.try_normalize() else {
            return Err(CoreError::invalid(format!("spin axis {} has no direction", axis)));
        };
        if !radians_per_frame.is_finite() {
            return Err(CoreError::invalid("spin rate must be finite"));
        }
        Ok(Self {
            axis,
            radians_per_frame,
            step: Quat::from_axis_angle(axis, radians_per_frame),
        })
    }

    /// Spin about +Y at [`DEFAULT_SPIN_RATE`]
    pub fn around_y() -> Self {
        Self {
            axis: Vec3::Y,
            radians_per_frame: DEFAULT_SPIN_RATE,
            step: Quat::from_rotation_y(DEFAULT_SPIN_RATE),
        }
    }

    /// Normalized spin axis
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Angle added each frame
    pub fn radians_per_frame(&self) -> f32 {
        self.radians_per_frame
    }

    /// Add one frame of rotation to `visual`
    pub fn apply<V: VisualPose + ?Sized>(&self, visual: &mut V) {
        let rotated = (self.step * visual.orientation()).normalize();
        visual.set_orientation(rotated);
    }
}
