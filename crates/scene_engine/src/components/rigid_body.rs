//! Physics-facing components
//!
//! [`RigidBody`] and [`TriggerVolume`] only describe bodies; the scene
//! registers them with its physics world on the next tick and keeps them in
//! sync with the owner's transform.

use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::physics::{BodyHandle, BodyKind, Collider};
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Collidable body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBody {
    /// Simulation role
    pub kind: BodyKind,
    /// Shapes in body space
    pub colliders: Vec<Collider>,
    /// Mass for impulses
    pub mass: f32,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Linear velocity (dynamic bodies; written back after each step)
    pub linear_velocity: Vec3,
    #[serde(skip, default = "Vec3::zeros")]
    pending_impulse: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(BodyKind::Dynamic, vec![Collider::sphere(0.5)])
    }
}

impl RigidBody {
    /// Body of the given kind
    pub fn new(kind: BodyKind, colliders: Vec<Collider>) -> Self {
        Self {
            kind,
            colliders,
            mass: 1.0,
            gravity_scale: 1.0,
            linear_velocity: Vec3::zeros(),
            pending_impulse: Vec3::zeros(),
        }
    }

    /// Builder pattern: set the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Builder pattern: set the gravity multiplier
    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Queue an impulse for the next physics step (dynamic bodies only)
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.pending_impulse += impulse;
    }

    /// Impulse queued since the last step
    pub fn pending_impulse(&self) -> Vec3 {
        self.pending_impulse
    }

    pub(crate) fn take_impulse(&mut self) -> Vec3 {
        std::mem::replace(&mut self.pending_impulse, Vec3::zeros())
    }
}

impl Component for RigidBody {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.label(&format!("Kind: {:?}, {} colliders", self.kind, self.colliders.len()));
        ui.drag_float("Mass", &mut self.mass);
        ui.drag_float("Gravity Scale", &mut self.gravity_scale);
        ui.drag_float3("Velocity", &mut self.linear_velocity);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for RigidBody {
    const TYPE_NAME: &'static str = "RigidBody";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}

/// Overlap region raising enter/leave hooks on its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerVolume {
    /// Shapes in body space
    pub colliders: Vec<Collider>,
    #[serde(skip)]
    overlapping: BTreeSet<BodyHandle>,
}

impl Default for TriggerVolume {
    fn default() -> Self {
        Self::new(vec![Collider::sphere(1.0)])
    }
}

impl TriggerVolume {
    /// Trigger made of `colliders`
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self {
            colliders,
            overlapping: BTreeSet::new(),
        }
    }

    /// Bodies inside the volume as of the last tick
    pub fn overlapping(&self) -> &BTreeSet<BodyHandle> {
        &self.overlapping
    }

    pub(crate) fn set_overlapping(&mut self, overlapping: BTreeSet<BodyHandle>) {
        self.overlapping = overlapping;
    }
}

impl Component for TriggerVolume {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.label(&format!("{} colliders, {} bodies inside", self.colliders.len(), self.overlapping.len()));
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for TriggerVolume {
    const TYPE_NAME: &'static str = "TriggerVolume";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}
