//! Impulse jump for dynamic bodies

use super::rigid_body::RigidBody;
use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::input::KeyCode;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};

/// Options for [`JumpBehaviour`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Upward impulse per jump
    pub impulse: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self { impulse: 10.0 }
    }
}

/// Kicks the sibling [`RigidBody`] upwards when Space is pressed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpBehaviour {
    /// Options
    #[serde(flatten)]
    pub config: JumpConfig,
}

impl JumpBehaviour {
    /// Jump with the given impulse
    pub fn new(impulse: f32) -> Self {
        Self {
            config: JumpConfig { impulse },
        }
    }
}

impl Component for JumpBehaviour {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn awake(&mut self, ctx: &mut ComponentContext<'_>) {
        if !ctx.object.has::<RigidBody>() {
            log::warn!("JumpBehaviour on '{}' has no RigidBody to push", ctx.object.name());
        }
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        if !ctx.input.was_pressed(KeyCode::Space) {
            return;
        }
        if let Some(body) = ctx.object.get_mut::<RigidBody>() {
            body.apply_impulse(Vec3::new(0.0, 0.0, self.config.impulse));
        }
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.drag_float("Impulse", &mut self.config.impulse);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for JumpBehaviour {
    const TYPE_NAME: &'static str = "JumpBehaviour";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}
