//! Frame loop simulation system
//!
//! Drives a World one fixed frame at a time:
//! - Dice throws at a configured frame
//! - Physics stepping, pose sync, followers and spinners (via `World::update`)
//! - Arrival logging

use tabletop_core::{Arrival, CoreError, EntityKey, FollowState, RollGenerator, World, FIXED_TIMESTEP};

use crate::config::{DebugConfig, SimulationConfig};

/// What happened during one frame
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Index of the frame that just ran
    pub frame: u64,
    /// Dice thrown at the start of the frame
    pub dice_rolled: usize,
    /// Waypoint arrivals during the frame
    pub arrivals: Vec<Arrival>,
}

/// Totals over a run of frames
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames run
    pub frames: u64,
    /// Dice thrown
    pub dice_rolled: usize,
    /// Waypoint arrivals
    pub arrivals: usize,
}

/// Manages the fixed-step frame loop
pub struct SimulationSystem {
    frame: u64,
    roll_at_frame: Option<u64>,
    rng: RollGenerator,
    log_arrivals: bool,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new(simulation: &SimulationConfig, debug: &DebugConfig) -> Self {
        Self {
            frame: 0,
            roll_at_frame: simulation.roll_at_frame,
            rng: RollGenerator::new(simulation.seed),
            log_arrivals: debug.log_arrivals,
        }
    }

    /// Number of frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start every idle follower at waypoint `cursor`
    ///
    /// Stands in for the host's "asset loaded" event. Returns how many
    /// followers were started.
    pub fn start_idle_followers(&self, world: &mut World, cursor: usize) -> Result<usize, CoreError> {
        let idle: Vec<EntityKey> = world
            .followers()
            .filter(|(_, follower)| follower.state() == FollowState::Idle)
            .map(|(key, _)| key)
            .collect();
        for &key in &idle {
            world.assign_first_target(key, cursor)?;
        }
        Ok(idle.len())
    }

    /// Run one frame
    pub fn update(&mut self, world: &mut World) -> FrameReport {
        let frame = self.frame;
        let mut dice_rolled = 0;
        if self.roll_at_frame == Some(frame) {
            dice_rolled = world.roll_dice(&mut self.rng);
            log::info!("Frame {}: rolled {} dice", frame, dice_rolled);
        }

        let arrivals = world.update(FIXED_TIMESTEP);
        if self.log_arrivals {
            for arrival in &arrivals {
                let name = world
                    .get_entity(arrival.entity)
                    .and_then(|e| e.name.as_deref())
                    .unwrap_or("<unnamed>");
                log::info!(
                    "Frame {}: {} reached waypoint {} at {}, heading for {}",
                    frame,
                    name,
                    arrival.reached,
                    arrival.position,
                    arrival.next
                );
            }
        }

        self.frame += 1;
        FrameReport {
            frame,
            dice_rolled,
            arrivals,
        }
    }

    /// Run `frames` frames
    pub fn run(&mut self, world: &mut World, frames: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..frames {
            let report = self.update(world);
            summary.frames += 1;
            summary.dice_rolled += report.dice_rolled;
            summary.arrivals += report.arrivals.len();
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;
    use glam::Vec3;
    use tabletop_core::{Appearance, PhysicsConfig, PhysicsMaterial};

    fn system(roll_at_frame: Option<u64>) -> SimulationSystem {
        let simulation = SimulationConfig {
            roll_at_frame,
            ..SimulationConfig::default()
        };
        SimulationSystem::new(&simulation, &DebugConfig::default())
    }

    #[test]
    fn test_rolls_once_at_configured_frame() {
        let mut world = SceneBuilder::new()
            .with_physics(PhysicsConfig::default())
            .add_floor(0.0, 30.0, PhysicsMaterial::FELT)
            .add_die("die", Vec3::new(0.0, 0.5, 0.0))
            .build()
            .unwrap();
        let mut sim = system(Some(3));

        let reports: Vec<FrameReport> = (0..5).map(|_| sim.update(&mut world)).collect();

        let rolled: Vec<usize> = reports.iter().map(|r| r.dice_rolled).collect();
        assert_eq!(rolled, vec![0, 0, 0, 1, 0]);
        assert_eq!(sim.frame(), 5);
    }

    #[test]
    fn test_run_counts_arrivals() {
        let mut world = SceneBuilder::new()
            .add_token("token", Vec3::ZERO, 0.3, Appearance::RED)
            .add_route_follower("token", vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)], 0.5, Some(1))
            .build()
            .unwrap();
        let mut sim = system(None);

        // Two moving frames and one snap frame per leg
        let summary = sim.run(&mut world, 9);

        assert_eq!(summary, RunSummary { frames: 9, dice_rolled: 0, arrivals: 3 });
    }

    #[test]
    fn test_start_idle_followers() {
        let mut world = SceneBuilder::new()
            .add_token("a", Vec3::ZERO, 0.3, Appearance::RED)
            .add_token("b", Vec3::ZERO, 0.3, Appearance::RED)
            .add_route_follower("a", vec![Vec3::ZERO, Vec3::X], 0.1, None)
            .add_route_follower("b", vec![Vec3::ZERO, Vec3::X, Vec3::Z], 0.1, Some(2))
            .build()
            .unwrap();
        let sim = system(None);

        assert_eq!(sim.start_idle_followers(&mut world, 1).unwrap(), 1);

        let a = world.find("a").unwrap();
        let b = world.find("b").unwrap();
        assert_eq!(world.follower(a).unwrap().cursor(), Some(1));
        assert_eq!(world.follower(b).unwrap().cursor(), Some(2));
    }

    #[test]
    fn test_start_idle_followers_out_of_range() {
        let mut world = SceneBuilder::new()
            .add_token("a", Vec3::ZERO, 0.3, Appearance::RED)
            .add_route_follower("a", vec![Vec3::ZERO], 0.1, None)
            .build()
            .unwrap();

        let result = system(None).start_idle_followers(&mut world, 1);
        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }
}
