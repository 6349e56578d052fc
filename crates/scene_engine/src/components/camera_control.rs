//! Free-fly camera driven by the keyboard
//!
//! W/S move along the view direction, A/D strafe, Q/E move down/up along
//! world Z. Arrow keys turn (left/right) and pitch (up/down). Holding left
//! shift multiplies the movement speed.

use crate::editor::Inspector;
use crate::foundation::math::{euler_degrees_to_quat, Vec3};
use crate::input::{InputSnapshot, KeyCode};
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};

/// Options for [`SimpleCameraControl`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraControlConfig {
    /// Units per second along (strafe, forward, vertical)
    pub move_speeds: Vec3,
    /// Speed factor while shift is held
    pub shift_multiplier: f32,
    /// Degrees per second for arrow-key look
    pub look_speed: f32,
}

impl Default for CameraControlConfig {
    fn default() -> Self {
        Self {
            move_speeds: Vec3::new(10.0, 10.0, 10.0),
            shift_multiplier: 2.0,
            look_speed: 90.0,
        }
    }
}

/// Keyboard fly camera
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleCameraControl {
    /// Options
    #[serde(flatten)]
    pub config: CameraControlConfig,
}

fn axis(input: &InputSnapshot, positive: KeyCode, negative: KeyCode) -> f32 {
    f32::from(u8::from(input.is_down(positive))) - f32::from(u8::from(input.is_down(negative)))
}

impl Component for SimpleCameraControl {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let input = ctx.input;
        let dt = ctx.delta_time;

        let yaw = axis(input, KeyCode::Left, KeyCode::Right);
        let pitch = axis(input, KeyCode::Up, KeyCode::Down);
        let mut rotation = ctx.object.rotation();
        if yaw != 0.0 || pitch != 0.0 {
            rotation.z += yaw * self.config.look_speed * dt;
            rotation.x = (rotation.x + pitch * self.config.look_speed * dt).clamp(0.0, 180.0);
            ctx.object.set_rotation(rotation);
        }

        let strafe = axis(input, KeyCode::D, KeyCode::A);
        let forward = axis(input, KeyCode::W, KeyCode::S);
        let vertical = axis(input, KeyCode::E, KeyCode::Q);
        if strafe == 0.0 && forward == 0.0 && vertical == 0.0 {
            return;
        }

        let boost = if input.is_down(KeyCode::LeftShift) {
            self.config.shift_multiplier
        } else {
            1.0
        };
        let orientation = euler_degrees_to_quat(&rotation);
        let speeds = self.config.move_speeds * boost * dt;
        let delta = orientation * Vec3::x() * (strafe * speeds.x)
            + orientation * -Vec3::z() * (forward * speeds.y)
            + Vec3::z() * (vertical * speeds.z);
        ctx.object.set_position(ctx.object.position() + delta);
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.drag_float3("Move Speeds", &mut self.config.move_speeds);
        ui.drag_float("Shift Multiplier", &mut self.config.shift_multiplier);
        ui.drag_float("Look Speed", &mut self.config.look_speed);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for SimpleCameraControl {
    const TYPE_NAME: &'static str = "SimpleCameraControl";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        from_payload(Self::TYPE_NAME, value)
    }
}
