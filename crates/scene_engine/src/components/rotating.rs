//! Constant spin

use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};

/// Options for [`RotatingBehaviour`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotatingConfig {
    /// Degrees per second around each axis
    pub speed: Vec3,
}

impl Default for RotatingConfig {
    fn default() -> Self {
        Self {
            speed: Vec3::new(0.0, 0.0, 90.0),
        }
    }
}

/// Rotates its owner at a constant rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotatingBehaviour {
    /// Options
    #[serde(flatten)]
    pub config: RotatingConfig,
}

impl RotatingBehaviour {
    /// Spin at `speed` degrees per second
    pub fn new(speed: Vec3) -> Self {
        Self {
            config: RotatingConfig { speed },
        }
    }
}

impl Component for RotatingBehaviour {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let rotation = ctx.object.rotation() + self.config.speed * ctx.delta_time;
        ctx.object.set_rotation(rotation);
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.drag_float3("Speed", &mut self.config.speed);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for RotatingBehaviour {
    const TYPE_NAME: &'static str = "RotatingBehaviour";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_accumulates_with_time() {
        let mut scene = Scene::new();
        let id = scene.create_game_object("spinner");
        scene.object_mut(id).unwrap().add(RotatingBehaviour::default()).unwrap();

        for _ in 0..4 {
            scene.update(0.25, &InputSnapshot::empty());
        }

        assert_relative_eq!(scene.object(id).unwrap().rotation(), Vec3::new(0.0, 0.0, 90.0), epsilon = 1e-4);
    }

    #[test]
    fn test_payload_is_flat() {
        let value = RotatingBehaviour::new(Vec3::new(1.0, 2.0, 3.0)).to_value().unwrap();
        assert_eq!(value, serde_json::json!({ "speed": [1.0, 2.0, 3.0] }));
    }
}
