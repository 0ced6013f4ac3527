//! Tabletop - headless frame loop
//!
//! Loads a scene, runs it for a configured number of fixed frames and logs
//! what happened: dice throws, token arrivals, and the faces the dice show.

use std::process::ExitCode;

use tabletop::config::AppConfig;
use tabletop::systems::SimulationSystem;
use tabletop_core::{Scene, SceneValidator};

fn main() -> ExitCode {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    log::info!("Starting tabletop");
    if let Err(e) = &loaded {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    let scene = match Scene::load(&config.scene.path) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to load scene {}: {}", config.scene.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if config.scene.validate {
        for problem in SceneValidator::validate(&scene) {
            log::warn!("Scene '{}': {}", scene.name, problem);
        }
    }

    let mut world = match scene.instantiate_with(Some(config.physics.to_physics_config())) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Failed to instantiate scene '{}': {}", scene.name, e);
            return ExitCode::FAILURE;
        }
    };

    let mut simulation = SimulationSystem::new(&config.simulation, &config.debug);
    match simulation.start_idle_followers(&mut world, config.simulation.first_target) {
        Ok(0) => {}
        Ok(started) => log::info!("Started {} followers", started),
        Err(e) => {
            log::error!("Failed to start followers: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let summary = simulation.run(&mut world, config.simulation.frames);
    log::info!(
        "Ran {} frames: {} dice thrown, {} waypoint arrivals",
        summary.frames,
        summary.dice_rolled,
        summary.arrivals
    );

    for (key, face) in world.top_faces() {
        let name = world
            .get_entity(key)
            .and_then(|e| e.name.as_deref())
            .unwrap_or("<unnamed>");
        log::info!("{} shows {}", name, face);
    }

    ExitCode::SUCCESS
}
