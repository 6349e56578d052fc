//! Component trait and lifecycle
//!
//! Components are the behaviour and data units attached to game objects.
//! Every hook receives a [`ComponentContext`] giving mutable access to the
//! owning object, the frame's input snapshot and a read-only view of the
//! rest of the scene. Components never hold references back to their owner.
//!
//! Persistence goes through [`Component::to_value`] and
//! [`ComponentType::from_value`]; the [`ComponentRegistry`](super::ComponentRegistry)
//! maps the type names written to scene documents back to constructors.

use super::game_object::{GameObject, GameObjectId, ObjectGuid};
use super::SceneError;
use crate::assets::{Asset, AssetId, ResourceManager};
use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::input::InputSnapshot;
use crate::physics::BodyHandle;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Upcast to [`Any`] for runtime type queries
pub trait AsAny: Any {
    /// Shared [`Any`] view
    fn as_any(&self) -> &dyn Any;

    /// Mutable [`Any`] view
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to a game object
///
/// Only `type_name` and `to_value` are required; every hook defaults to a
/// no-op so components implement just the capabilities they use.
pub trait Component: AsAny + Send + Sync + fmt::Debug {
    /// Name written to scene documents
    fn type_name(&self) -> &'static str;

    /// Called once, before the first update, when the scene activates
    fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once per scene tick
    fn update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// A body started overlapping a trigger volume on the owner
    fn on_trigger_volume_entered(&mut self, _ctx: &mut ComponentContext<'_>, _contact: &TriggerContact) {}

    /// A body stopped overlapping a trigger volume on the owner
    fn on_trigger_volume_leaving(&mut self, _ctx: &mut ComponentContext<'_>, _contact: &TriggerContact) {}

    /// Draw editable fields
    fn render_inspector(&mut self, _ui: &mut dyn Inspector) {}

    /// Serialized payload
    fn to_value(&self) -> Result<serde_json::Value, SceneError>;
}

/// Components that can be rebuilt from a scene document
pub trait ComponentType: Component + Sized {
    /// Name under which the type is registered
    const TYPE_NAME: &'static str;

    /// Rebuild from a payload produced by [`Component::to_value`]
    fn from_value(value: &serde_json::Value, ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError>;
}

/// Lifecycle state of an attached component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Attached, awake not yet called
    AwakePending,
    /// Awake done, receives updates
    Active,
}

/// What a hook can see and touch
pub struct ComponentContext<'a> {
    /// Owner of the running component
    pub object: &'a mut GameObject,
    /// Owner's runtime id
    pub id: GameObjectId,
    /// Key state for this tick
    pub input: &'a InputSnapshot,
    /// Seconds since the previous tick
    pub delta_time: f32,
    /// Other objects as they were at the start of the pass
    pub world: &'a WorldView,
}

impl fmt::Debug for ComponentContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("object", &self.object.name())
            .field("id", &self.id)
            .field("delta_time", &self.delta_time)
            .finish_non_exhaustive()
    }
}

/// Read-only summary of one game object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    /// Runtime id
    pub id: GameObjectId,
    /// Persistent id
    pub guid: ObjectGuid,
    /// Display name
    pub name: String,
    /// World-space position
    pub world_position: Vec3,
    /// Type names of the attached components, in attachment order
    pub components: Vec<&'static str>,
}

impl ObjectSummary {
    /// True if a component registered as `type_name` is attached
    pub fn has_component(&self, type_name: &str) -> bool {
        self.components.iter().any(|name| *name == type_name)
    }
}

/// Snapshot of every object, taken before components run
#[derive(Debug, Clone, Default)]
pub struct WorldView {
    objects: Vec<ObjectSummary>,
}

impl WorldView {
    pub(crate) fn new(objects: Vec<ObjectSummary>) -> Self {
        Self { objects }
    }

    /// First object with the given name, in creation order
    pub fn find_by_name(&self, name: &str) -> Option<&ObjectSummary> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Summary of a specific object
    pub fn get(&self, id: GameObjectId) -> Option<&ObjectSummary> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// All objects in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectSummary> {
        self.objects.iter()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene was empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One overlap transition reported to trigger hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerContact {
    /// The trigger volume's body
    pub trigger: BodyHandle,
    /// The body that entered or left
    pub body: BodyHandle,
    /// Owner of that body
    pub other: GameObjectId,
}

/// Services available while rebuilding components from a document
#[derive(Debug, Clone, Copy)]
pub struct ComponentLoadContext<'a> {
    /// Source of every asset a payload may reference
    pub resources: &'a ResourceManager,
}

impl<'a> ComponentLoadContext<'a> {
    /// Context resolving assets through `resources`
    pub fn new(resources: &'a ResourceManager) -> Self {
        Self { resources }
    }

    /// Resolve an asset id, failing the load if it is not loaded
    pub fn asset<T: Asset>(&self, id: AssetId) -> Result<Arc<T>, SceneError> {
        self.resources.get::<T>(id).ok_or_else(|| SceneError::MissingAsset {
            kind: T::KIND,
            id,
            detail: match (self.resources.failure(id), self.resources.kind_of(id)) {
                (Some(reason), _) => format!("failed to load ({reason})"),
                (None, Some(other)) => format!("id holds a {other}"),
                (None, None) => "not loaded".to_string(),
            },
        })
    }
}

/// Serialize a component's config struct into a payload
pub fn to_payload<T: Serialize>(component: &'static str, value: &T) -> Result<serde_json::Value, SceneError> {
    serde_json::to_value(value).map_err(|e| SceneError::InvalidComponent {
        component: component.to_string(),
        reason: e.to_string(),
    })
}

/// Deserialize a payload into a component's config struct
///
/// A missing (`null`) payload reads as an empty object, so types with
/// `#[serde(default)]` fall back to their defaults.
pub fn from_payload<T: DeserializeOwned>(component: &'static str, value: &serde_json::Value) -> Result<T, SceneError> {
    let empty = serde_json::Value::Object(serde_json::Map::new());
    let value = if value.is_null() { &empty } else { value };
    T::deserialize(value).map_err(|e| SceneError::InvalidComponent {
        component: component.to_string(),
        reason: e.to_string(),
    })
}
