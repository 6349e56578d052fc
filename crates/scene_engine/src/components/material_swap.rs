//! Material swap on trigger enter/leave

use super::render_component::RenderComponent;
use crate::assets::{Asset, AssetId, Material};
use crate::editor::Inspector;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError, TriggerContact};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SwapPayload {
    #[serde(default)]
    enter_material: Option<AssetId>,
    #[serde(default)]
    exit_material: Option<AssetId>,
}

/// Changes the sibling [`RenderComponent`]'s material while something is
/// inside the owner's trigger volume
#[derive(Debug, Clone, Default)]
pub struct MaterialSwapBehaviour {
    /// Material applied when a body enters
    pub enter_material: Option<Arc<Material>>,
    /// Material applied when a body leaves
    pub exit_material: Option<Arc<Material>>,
}

impl MaterialSwapBehaviour {
    /// Swap between two materials
    pub fn new(enter_material: Arc<Material>, exit_material: Arc<Material>) -> Self {
        Self {
            enter_material: Some(enter_material),
            exit_material: Some(exit_material),
        }
    }

    fn apply(ctx: &mut ComponentContext<'_>, material: Option<&Arc<Material>>) {
        let Some(material) = material else {
            return;
        };
        match ctx.object.get_mut::<RenderComponent>() {
            Some(renderer) => renderer.set_material(Arc::clone(material)),
            None => log::warn!("MaterialSwapBehaviour on '{}' has no RenderComponent", ctx.object.name()),
        }
    }
}

impl Component for MaterialSwapBehaviour {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_trigger_volume_entered(&mut self, ctx: &mut ComponentContext<'_>, _contact: &TriggerContact) {
        Self::apply(ctx, self.enter_material.as_ref());
    }

    fn on_trigger_volume_leaving(&mut self, ctx: &mut ComponentContext<'_>, _contact: &TriggerContact) {
        Self::apply(ctx, self.exit_material.as_ref());
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        let name = |m: &Option<Arc<Material>>| m.as_ref().map_or("none", |m| m.name()).to_string();
        ui.label(&format!("Enter: {}", name(&self.enter_material)));
        ui.label(&format!("Exit: {}", name(&self.exit_material)));
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        let payload = SwapPayload {
            enter_material: self.enter_material.as_ref().map(|m| m.id()),
            exit_material: self.exit_material.as_ref().map(|m| m.id()),
        };
        to_payload(Self::TYPE_NAME, &payload)
    }
}

impl ComponentType for MaterialSwapBehaviour {
    const TYPE_NAME: &'static str = "MaterialSwapBehaviour";

    fn from_value(value: &serde_json::Value, ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        let payload: SwapPayload = from_payload(Self::TYPE_NAME, value)?;
        Ok(Self {
            enter_material: payload.enter_material.map(|id| ctx.asset::<Material>(id)).transpose()?,
            exit_material: payload.exit_material.map(|id| ctx.asset::<Material>(id)).transpose()?,
        })
    }
}
