//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TT_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which scene to run
    #[serde(default)]
    pub scene: SceneConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Frame loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TT_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TT_SIMULATION__FRAMES=60 -> simulation.frames = 60
        figment = figment.merge(Env::prefixed("TT_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Scene selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Path to the RON scene file
    pub path: PathBuf,
    /// Run the scene validator before instantiating
    pub validate: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scenes/dice_arena.ron"),
            validate: true,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity [x, y, z], used when the scene sets none
    pub gravity: [f32; 3],
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }
}

impl PhysicsConfig {
    /// Convert to the physics crate's settings
    pub fn to_physics_config(&self) -> tabletop_physics::PhysicsConfig {
        tabletop_physics::PhysicsConfig::new(self.gravity.into())
            .with_damping(self.linear_damping, self.angular_damping)
    }
}

/// Frame loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of frames to run
    pub frames: u64,
    /// Frame at which to throw the dice, if any
    pub roll_at_frame: Option<u64>,
    /// Seed for dice throws
    pub seed: u64,
    /// First waypoint for followers the scene leaves idle
    pub first_target: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            roll_at_frame: Some(60),
            seed: 1,
            first_target: 1,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log every follower arrival
    pub log_arrivals: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_arrivals: true,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
