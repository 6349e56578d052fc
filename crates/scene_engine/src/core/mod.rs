//! # Core Engine Module
//!
//! Settings shared by the engine driver and applications.

pub mod config;

pub use config::{load_optional, Config, ConfigError, EngineConfig, GameplayConfig};
