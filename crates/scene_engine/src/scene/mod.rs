//! Scene runtime
//!
//! Game objects with local transforms and a parent hierarchy, polymorphic
//! components with a lifecycle, and the [`Scene`] that owns them together
//! with lights, environment settings and a physics world.
//!
//! ## Tick
//!
//! ```text
//! Scene::update(dt, input)
//!      ↓
//! awake pending components
//!      ↓
//! update components (creation order, attachment order)
//!      ↓
//! physics sync + step
//!      ↓
//! trigger enter/leave dispatch
//! ```
//!
//! Scenes round-trip through [`SceneDocument`]; assets are referenced by id
//! and resolved through a [`ResourceManager`](crate::assets::ResourceManager).

pub mod component;
pub mod document;
pub mod environment;
pub mod game_object;
pub mod registry;
pub mod render_frame;
pub mod scene_graph;

pub use component::{
    AsAny, Component, ComponentContext, ComponentLoadContext, ComponentState, ComponentType, ObjectSummary,
    TriggerContact, WorldView,
};
pub use document::{ComponentRecord, GameObjectRecord, SceneDocument, SkyboxRecord, SCENE_VERSION};
pub use environment::{Environment, Light, RenderFlags, Skybox, MAX_LIGHTS};
pub use game_object::{GameObject, GameObjectId, ObjectGuid};
pub use registry::ComponentRegistry;
pub use render_frame::{DrawItem, RenderFrame};
pub use scene_graph::Scene;

use crate::assets::{AssetId, AssetKind};
use thiserror::Error;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// No object with that id
    #[error("Unknown game object {0:?}")]
    UnknownObject(GameObjectId),

    /// The main camera (or an ancestor) was about to be destroyed
    #[error("'{name}' is the main camera; assign another camera first")]
    MainCameraRemoval {
        /// Camera object name
        name: String,
    },

    /// Main camera candidate has no camera component
    #[error("'{name}' has no Camera component")]
    NotACamera {
        /// Object name
        name: String,
    },

    /// Reparenting would create a loop
    #[error("Cannot parent '{child}' to '{parent}': would create a cycle")]
    ParentCycle {
        /// Object being reparented
        child: String,
        /// Requested parent
        parent: String,
    },

    /// A component of that type is already attached
    #[error("'{object}' already has a {component}")]
    DuplicateComponent {
        /// Object name
        object: String,
        /// Component type name
        component: &'static str,
    },

    /// Scene document names an unregistered component type
    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    /// Scene references an asset that is not loaded
    #[error("Missing {kind} {id}: {detail}")]
    MissingAsset {
        /// Expected kind
        kind: AssetKind,
        /// Referenced id
        id: AssetId,
        /// Why the asset is absent, naming the source file when known
        detail: String,
    },

    /// Component payload could not be (de)serialized
    #[error("Invalid {component} data: {reason}")]
    InvalidComponent {
        /// Component type name
        component: String,
        /// What went wrong
        reason: String,
    },

    /// Malformed scene document
    #[error("Scene serialization error: {0}")]
    Serialization(String),

    /// File access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-size table is full
    #[error("Too many {what} (max {max})")]
    Capacity {
        /// What ran out
        what: &'static str,
        /// Slot count
        max: usize,
    },
}
