//! # Scene Engine
//!
//! A scene/component game runtime: game objects in a transform hierarchy,
//! behaviours attached as components, a deduplicating resource manager and
//! JSON scene documents that round-trip the whole thing.
//!
//! ## Features
//!
//! - **Scene Graph**: parent/child transforms composed on query
//! - **Components**: polymorphic behaviours with awake/update/trigger hooks
//! - **Physics Bridge**: rigid bodies and edge-triggered trigger volumes
//! - **Resources**: shared meshes, textures, shaders and materials with a manifest
//! - **Serialization**: deterministic save and load of scenes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!
//!     let mut scene = Scene::new();
//!     let spinner = scene.create_game_object("Spinner");
//!     if let Some(object) = scene.object_mut(spinner) {
//!         object.add(RotatingBehaviour::new(Vec3::new(0.0, 0.0, 90.0)))?;
//!     }
//!     engine.set_scene(scene)?;
//!
//!     engine.tick(1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]

// Core engine modules
pub mod core;
pub mod foundation;
pub mod config;
pub mod input;
pub mod assets;
pub mod physics;

// Scene runtime
pub mod scene;
pub mod components;
pub mod editor;

mod engine;

pub use engine::{Engine, EngineError};
pub use crate::core::{EngineConfig, GameplayConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Asset, AssetId, Material, MaterialParams, Mesh, MeshSource, ResourceManager, ShaderProgram, Texture2D},
        components::{
            Camera, CharacterMovement, EnemyPatrol, JumpBehaviour, MaterialSwapBehaviour, RenderComponent, RigidBody,
            RotatingBehaviour, SimpleCameraControl, TriggerVolume, TriggerVolumeEnterBehaviour,
        },
        core::config::Config,
        editor::{DebugPanel, Inspector, RecordingInspector},
        foundation::math::{Mat4, Quat, Vec3},
        input::{ButtonState, InputSnapshot, KeyCode},
        physics::{BodyKind, Collider},
        scene::{
            Component, ComponentContext, ComponentRegistry, ComponentType, GameObject, GameObjectId, Light,
            RenderFlags, Scene, SceneError,
        },
        Engine, EngineConfig, EngineError, GameplayConfig,
    };
}
