//! Waypoint following
//!
//! A [`WaypointFollower`] glides a visual object around a closed route at a
//! constant distance per frame. Arrival snaps the object onto the waypoint so
//! the route never drifts, then the next waypoint becomes the target.
//!
//! Displacement is per frame, not per second: the host's frame cadence sets
//! the visual speed.

use std::sync::Arc;

use glam::Vec3;

use crate::error::CoreError;
use crate::pose::VisualPose;

/// Default distance at which a waypoint counts as reached
pub const DEFAULT_ARRIVAL_TOLERANCE: f32 = 0.05;

/// An ordered, cyclic, non-empty list of points
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointSequence {
    points: Vec<Vec3>,
}

impl WaypointSequence {
    /// Create a sequence; fails if `points` is empty
    pub fn new(points: Vec<Vec3>) -> Result<Self, CoreError> {
        if points.is_empty() {
            return Err(CoreError::invalid("waypoint sequence is empty"));
        }
        Ok(Self { points })
    }

    /// Number of waypoints (never zero)
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Waypoint at `cursor`, if in range
    pub fn get(&self, cursor: usize) -> Option<Vec3> {
        self.points.get(cursor).copied()
    }

    /// Cursor after `cursor`, wrapping to 0 at the end
    #[inline]
    pub fn next_cursor(&self, cursor: usize) -> usize {
        (cursor + 1) % self.points.len()
    }

    /// All waypoints in order
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

/// Where a follower is in its life
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowState {
    /// No target assigned yet
    Idle,
    /// Heading for the waypoint at `cursor`
    Moving {
        /// Index of the current target
        cursor: usize,
    },
}

/// What one call to [`WaypointFollower::advance`] did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowStep {
    /// Not started; nothing moved
    Idle,
    /// Moved toward the target; `remaining` is the distance left
    Moved {
        /// Distance to the target after this frame's move
        remaining: f32,
    },
    /// Snapped onto waypoint `reached`; now heading for `next`
    Arrived {
        /// Cursor of the waypoint just reached
        reached: usize,
        /// Cursor of the new target
        next: usize,
    },
}

/// Moves a visual object around a [`WaypointSequence`]
#[derive(Clone, Debug)]
pub struct WaypointFollower {
    route: Arc<WaypointSequence>,
    state: FollowState,
    speed: f32,
    arrival_tolerance: f32,
}

impl WaypointFollower {
    /// Create an idle follower moving `speed` units per frame
    ///
    /// `speed` must be finite and positive.
    pub fn new(route: Arc<WaypointSequence>, speed: f32) -> Result<Self, CoreError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(CoreError::invalid(format!(
                "follower speed must be positive, got {}",
                speed
            )));
        }
        Ok(Self {
            route,
            state: FollowState::Idle,
            speed,
            arrival_tolerance: DEFAULT_ARRIVAL_TOLERANCE,
        })
    }

    /// Create an idle follower over a fresh list of points
    pub fn from_points(points: Vec<Vec3>, speed: f32) -> Result<Self, CoreError> {
        Self::new(Arc::new(WaypointSequence::new(points)?), speed)
    }

    /// Override the arrival tolerance (finite and positive)
    pub fn with_arrival_tolerance(mut self, tolerance: f32) -> Result<Self, CoreError> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(CoreError::invalid(format!(
                "arrival tolerance must be positive, got {}",
                tolerance
            )));
        }
        self.arrival_tolerance = tolerance;
        Ok(self)
    }

    /// Start (or restart) following at waypoint `cursor`
    ///
    /// This is the host's "first target" event, typically sent once the
    /// followed object's asset has loaded.
    pub fn assign_first_target(&mut self, cursor: usize) -> Result<(), CoreError> {
        if cursor >= self.route.len() {
            return Err(CoreError::invalid(format!(
                "cursor {} out of range for a route of {} waypoints",
                cursor,
                self.route.len()
            )));
        }
        self.state = FollowState::Moving { cursor };
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Current target cursor, `None` while idle
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            FollowState::Idle => None,
            FollowState::Moving { cursor } => Some(cursor),
        }
    }

    /// Current target point, `None` while idle
    pub fn target(&self) -> Option<Vec3> {
        self.cursor().and_then(|cursor| self.route.get(cursor))
    }

    /// Distance moved per frame
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Distance at which a waypoint counts as reached
    pub fn arrival_tolerance(&self) -> f32 {
        self.arrival_tolerance
    }

    /// The route being followed
    pub fn route(&self) -> &Arc<WaypointSequence> {
        &self.route
    }

    /// Run one frame against `visual`
    ///
    /// Within tolerance of the target the visual snaps onto it and the cursor
    /// moves on (wrapping). Otherwise the visual moves `speed` toward the
    /// target, never past it.
    pub fn advance<V: VisualPose + ?Sized>(&mut self, visual: &mut V) -> FollowStep {
        let FollowState::Moving { cursor } = self.state else {
            return FollowStep::Idle;
        };
        // Cursor is range-checked on assignment and wrapped on arrival
        let Some(target) = self.route.get(cursor) else {
            return FollowStep::Idle;
        };

        let position = visual.position();
        let offset = target - position;
        let distance = offset.length();

        if distance <= self.arrival_tolerance {
            visual.set_position(target);
            let next = self.route.next_cursor(cursor);
            self.state = FollowState::Moving { cursor: next };
            return FollowStep::Arrived {
                reached: cursor,
                next,
            };
        }

        let step = self.speed.min(distance);
        visual.set_position(position + offset * (step / distance));
        FollowStep::Moved {
            remaining: distance - step,
        }
    }
}
