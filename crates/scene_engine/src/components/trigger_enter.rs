//! Logs bodies entering and leaving the owner's trigger volume

use crate::editor::Inspector;
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError, TriggerContact};

/// Counts what is inside the owner's trigger volume
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerVolumeEnterBehaviour {
    inside: usize,
    entered: u64,
}

impl TriggerVolumeEnterBehaviour {
    /// Bodies currently inside
    pub fn inside(&self) -> usize {
        self.inside
    }

    /// Enter events seen so far
    pub fn total_entered(&self) -> u64 {
        self.entered
    }
}

impl Component for TriggerVolumeEnterBehaviour {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn on_trigger_volume_entered(&mut self, ctx: &mut ComponentContext<'_>, contact: &TriggerContact) {
        self.inside += 1;
        self.entered += 1;
        let name = ctx.world.get(contact.other).map_or("<unknown>", |o| o.name.as_str());
        log::info!("'{name}' entered trigger volume on '{}'", ctx.object.name());
    }

    fn on_trigger_volume_leaving(&mut self, ctx: &mut ComponentContext<'_>, contact: &TriggerContact) {
        self.inside = self.inside.saturating_sub(1);
        let name = ctx.world.get(contact.other).map_or("<unknown>", |o| o.name.as_str());
        log::info!("'{name}' left trigger volume on '{}'", ctx.object.name());
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.label(&format!("Inside: {}", self.inside));
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        Ok(serde_json::Value::Object(serde_json::Map::new()))
    }
}

impl ComponentType for TriggerVolumeEnterBehaviour {
    const TYPE_NAME: &'static str = "TriggerVolumeEnterBehaviour";

    fn from_value(_value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        Ok(Self::default())
    }
}
