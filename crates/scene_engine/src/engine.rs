//! Core engine implementation

use crate::{
    assets::{AssetError, ManifestReport, ResourceManager},
    core::{ConfigError, EngineConfig},
    foundation::time::FixedStep,
    input::{InputTracker, KeyCode},
    scene::{ComponentRegistry, Scene, SceneError},
};
use std::path::Path;
use thiserror::Error;

/// Main engine struct
///
/// Owns the resources, the component registry and the active scene, and
/// turns variable frame times into fixed simulation ticks.
pub struct Engine {
    /// Engine configuration
    config: EngineConfig,

    /// Shared assets
    resources: ResourceManager,

    /// Component constructors used when loading scenes
    registry: ComponentRegistry,

    /// Raw key events collected between ticks
    input: InputTracker,

    /// Scene being simulated
    scene: Option<Scene>,

    /// Tick accumulator
    clock: FixedStep,
}

impl Engine {
    /// Create a new engine instance with the built-in components registered
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        log::info!("Initializing engine (assets at {})", config.asset_root.display());

        Ok(Self {
            resources: ResourceManager::with_root(&config.asset_root),
            registry: ComponentRegistry::with_builtin(),
            input: InputTracker::new(),
            scene: None,
            clock: FixedStep::new(config.fixed_timestep, config.max_frame_delta),
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the resource manager
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Get mutable access to the resource manager
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    /// Get the component registry
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Get mutable access to the component registry, e.g. to add game types
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Active scene, if any
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Mutable active scene, if any
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Replace the active scene, returning the previous one
    pub fn set_scene(&mut self, mut scene: Scene) -> Result<Option<Scene>, EngineError> {
        scene.set_light_capacity(self.config.max_lights)?;
        log::info!("Activating scene with {} objects", scene.object_count());
        Ok(self.scene.replace(scene))
    }

    /// Detach the active scene
    pub fn take_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    /// Load the manifest, then the scene, and make it active
    ///
    /// Manifest entries that fail are reported but do not stop the load; the
    /// scene itself either loads completely or leaves the engine untouched.
    pub fn load_scene(&mut self, manifest: impl AsRef<Path>, scene: impl AsRef<Path>) -> Result<ManifestReport, EngineError> {
        let report = self.resources.load_manifest(manifest)?;
        let scene = Scene::load(scene, &self.resources, &self.registry)?;
        self.set_scene(scene)?;
        Ok(report)
    }

    /// Load the manifest and scene named in the configuration
    pub fn load_configured_scene(&mut self) -> Result<ManifestReport, EngineError> {
        let manifest = self.config.manifest_path();
        let scene = self.config.scene_path();
        self.load_scene(manifest, scene)
    }

    /// Save the manifest and the active scene
    pub fn save_scene(&self, manifest: impl AsRef<Path>, scene: impl AsRef<Path>) -> Result<(), EngineError> {
        let active = self.scene.as_ref().ok_or(EngineError::NoScene)?;
        self.resources.save_manifest(manifest)?;
        active.save(scene)?;
        Ok(())
    }

    /// Save to the manifest and scene paths named in the configuration
    pub fn save_configured_scene(&self) -> Result<(), EngineError> {
        self.save_scene(self.config.manifest_path(), self.config.scene_path())
    }

    /// Handle key input from the platform layer
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        self.input.handle_key_input(key, pressed);
    }

    /// Advance by one frame and return the number of ticks run
    ///
    /// Key events are consumed by the first tick of the frame; a frame too
    /// short for a tick keeps them for the next one.
    pub fn tick(&mut self, frame_delta: f32) -> Result<u32, EngineError> {
        let scene = self.scene.as_mut().ok_or(EngineError::NoScene)?;
        let ticks = self.clock.advance(frame_delta);
        let step = self.clock.step();
        for _ in 0..ticks {
            let snapshot = self.input.next_snapshot();
            scene.update(step, &snapshot);
        }
        Ok(ticks)
    }

    /// Seconds per tick
    pub fn fixed_timestep(&self) -> f32 {
        self.clock.step()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Asset system error
    #[error("Asset system error: {0}")]
    Asset(#[from] AssetError),

    /// Scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operation needs an active scene
    #[error("No active scene")]
    NoScene,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RotatingBehaviour;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn engine() -> Engine {
        Engine::new(EngineConfig::new().with_fixed_timestep(0.1)).unwrap()
    }

    #[test]
    fn test_tick_without_scene_fails() {
        let mut engine = engine();
        assert!(matches!(engine.tick(0.1), Err(EngineError::NoScene)));
    }

    #[test]
    fn test_ticks_follow_fixed_step() {
        let mut engine = engine();
        let mut scene = Scene::new();
        let id = scene.create_game_object("Spinner");
        scene
            .object_mut(id)
            .unwrap()
            .add(RotatingBehaviour::new(Vec3::new(0.0, 0.0, 10.0)))
            .unwrap();
        engine.set_scene(scene).unwrap();

        assert_eq!(engine.tick(0.05).unwrap(), 0);
        assert_eq!(engine.tick(0.16).unwrap(), 2);
        let z = engine.scene().unwrap().object(id).unwrap().rotation().z;
        assert_relative_eq!(z, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::new().with_fixed_timestep(-1.0);
        assert!(matches!(Engine::new(config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_without_scene_fails() {
        let engine = engine();
        let dir = tempfile::tempdir().unwrap();
        let result = engine.save_scene(dir.path().join("m.json"), dir.path().join("s.json"));
        assert!(matches!(result, Err(EngineError::NoScene)));
    }
}
