//! # Engine and Gameplay Configuration
//!
//! Two top-level settings files drive a run:
//!
//! - **Engine Config**: asset root, scene file names, tick rate, light budget, logging
//! - **Gameplay Config**: per-component tuning applied to the sample level
//!
//! Both load from TOML or RON through the [`Config`] trait and fall back to
//! the shipped defaults for any missing field.

use crate::components::{
    CameraControlConfig, CharacterMovementConfig, EnemyPatrolConfig, JumpConfig, RotatingConfig,
};
use crate::scene::MAX_LIGHTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Where assets live, which files hold the manifest and the scene, and how
/// the fixed-step loop runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory relative asset paths and scene files resolve against
    pub asset_root: PathBuf,
    /// Resource manifest file name
    pub manifest_file: String,
    /// Scene document file name
    pub scene_file: String,
    /// Seconds per simulation tick
    pub fixed_timestep: f32,
    /// Longest frame delta fed to the tick accumulator
    pub max_frame_delta: f32,
    /// Light budget per scene
    pub max_lights: usize,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            manifest_file: "scene-manifest.json".to_string(),
            scene_file: "scene.json".to_string(),
            fixed_timestep: 1.0 / 60.0,
            max_frame_delta: 0.25,
            max_lights: MAX_LIGHTS,
            log_level: "info".to_string(),
        }
    }

    /// Set the asset root
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the tick length
    pub fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.fixed_timestep = step;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Manifest path under the asset root
    pub fn manifest_path(&self) -> PathBuf {
        self.asset_root.join(&self.manifest_file)
    }

    /// Scene path under the asset root
    pub fn scene_path(&self) -> PathBuf {
        self.asset_root.join(&self.scene_file)
    }

    /// Parsed log level, `Info` when unrecognised
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fixed_timestep.is_nan() || self.fixed_timestep <= 0.0 {
            return Err("Fixed timestep must be positive".to_string());
        }
        if self.max_frame_delta < self.fixed_timestep {
            return Err("Max frame delta must be at least one timestep".to_string());
        }
        if self.max_lights == 0 || self.max_lights > MAX_LIGHTS {
            return Err(format!("Max lights must be between 1 and {MAX_LIGHTS}"));
        }
        if self.manifest_file.is_empty() || self.scene_file.is_empty() {
            return Err("Manifest and scene file names cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

/// # Gameplay Configuration
///
/// Tuning for the built-in behaviours, one section per component. Values
/// are copied into components when a level is built, so a saved scene keeps
/// the numbers it was built with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Player controller
    pub character_movement: CharacterMovementConfig,
    /// Enemy patrol
    pub enemy_patrol: EnemyPatrolConfig,
    /// Spinning props
    pub rotating: RotatingConfig,
    /// Physics jump
    pub jump: JumpConfig,
    /// Free-fly camera
    pub camera_control: CameraControlConfig,
}

impl Config for GameplayConfig {}

/// Load `path` if it exists, otherwise defaults; parse errors still fail
pub fn load_optional<C: Config>(path: Option<&Path>) -> Result<C, ConfigError> {
    match path {
        Some(path) => C::load_or_default(path),
        None => Ok(C::default()),
    }
}
