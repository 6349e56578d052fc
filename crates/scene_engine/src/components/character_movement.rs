//! Side-scrolling player controller
//!
//! A/D strafe along X and turn the character to face the direction of
//! travel; Space or W starts a jump arc. Every constant is per tick, not per
//! second. A hazard entering the player's trigger volume costs one life and
//! respawns the player; losing the last life ends the game and freezes the
//! player. Hazards are objects carrying one of the configured component
//! types, so the floor or a thrown ball never hurts. Crossing the win line teleports the player to the win point.

use super::enemy_patrol::EnemyPatrol;
use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::input::KeyCode;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError, TriggerContact};
use serde::{Deserialize, Serialize};

/// Options for [`CharacterMovement`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterMovementConfig {
    /// Strafe distance per tick
    pub velocity_multiplier: f32,
    /// Vertical speed at the start of a jump
    pub jump_velocity: f32,
    /// Vertical speed lost per tick while airborne
    pub jump_decay: f32,
    /// Terminal falling speed
    pub min_jump_velocity: f32,
    /// Height at or below which a jump ends
    pub ground_height: f32,
    /// Height the player is snapped to on landing
    pub rest_height: f32,
    /// Respawn position after a hit
    pub spawn_point: Vec3,
    /// Lives at the start of the game
    pub lives: u32,
    /// X coordinate that wins the level
    pub win_x: f32,
    /// Where the player is parked after winning
    pub win_point: Vec3,
    /// Rotation while moving +X
    pub facing_right: Vec3,
    /// Rotation while moving -X
    pub facing_left: Vec3,
    /// Rotation while idle
    pub facing_idle: Vec3,
    /// Component types that mark an object as harmful on contact
    pub hazard_components: Vec<String>,
}

impl Default for CharacterMovementConfig {
    fn default() -> Self {
        Self {
            velocity_multiplier: 0.5,
            jump_velocity: 1.0,
            jump_decay: 0.06,
            min_jump_velocity: -1.0,
            ground_height: 0.9,
            rest_height: 1.0,
            spawn_point: Vec3::new(-4.0, 0.0, 1.0),
            lives: 3,
            win_x: 27.0,
            win_point: Vec3::new(8.79, -6.6, 5.78),
            facing_right: Vec3::new(0.0, 0.0, 90.0),
            facing_left: Vec3::new(0.0, 0.0, -90.0),
            facing_idle: Vec3::zeros(),
            hazard_components: vec![EnemyPatrol::TYPE_NAME.to_string()],
        }
    }
}

/// Player controller state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterMovement {
    /// Options
    #[serde(flatten)]
    pub config: CharacterMovementConfig,
    lives_left: u32,
    vertical_velocity: f32,
    grounded: bool,
    hit_pending: bool,
    won: bool,
    lost: bool,
}

impl Default for CharacterMovement {
    fn default() -> Self {
        Self::new(CharacterMovementConfig::default())
    }
}

impl CharacterMovement {
    /// Fresh controller with full lives
    pub fn new(config: CharacterMovementConfig) -> Self {
        Self {
            lives_left: config.lives,
            config,
            vertical_velocity: 0.0,
            grounded: true,
            hit_pending: false,
            won: false,
            lost: false,
        }
    }

    /// Lives left
    pub fn lives(&self) -> u32 {
        self.lives_left
    }

    /// True once the win line was crossed
    pub fn has_won(&self) -> bool {
        self.won
    }

    /// True once every life is gone
    pub fn has_lost(&self) -> bool {
        self.lost
    }

    /// True while not mid-jump
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn take_hit(&mut self, ctx: &mut ComponentContext<'_>) {
        self.hit_pending = false;
        self.lives_left = self.lives_left.saturating_sub(1);
        ctx.object.set_position(self.config.spawn_point);
        if self.lives_left == 0 {
            self.lost = true;
            log::info!("'{}' lost the game", ctx.object.name());
        } else {
            log::info!("'{}' lost a life, {} left", ctx.object.name(), self.lives_left);
        }
    }
}

impl Component for CharacterMovement {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.lost {
            return;
        }
        if self.hit_pending {
            self.take_hit(ctx);
            if self.lost {
                return;
            }
        }

        let config = &self.config;
        let right = ctx.input.is_down(KeyCode::D);
        let left = ctx.input.is_down(KeyCode::A);
        // A wins when both are held
        let facing = if left {
            config.facing_left
        } else if right {
            config.facing_right
        } else {
            config.facing_idle
        };
        ctx.object.set_rotation(facing);

        if self.grounded && (ctx.input.is_down(KeyCode::Space) || ctx.input.is_down(KeyCode::W)) {
            self.vertical_velocity = config.jump_velocity;
            self.grounded = false;
        }
        if !self.grounded && self.vertical_velocity > config.min_jump_velocity {
            self.vertical_velocity -= config.jump_decay;
        }
        let position = ctx.object.position();
        if !self.grounded && position.z <= config.ground_height {
            self.vertical_velocity = 0.0;
            self.grounded = true;
            ctx.object.set_position(Vec3::new(position.x, 0.0, config.rest_height));
        }

        let strafe = (f32::from(u8::from(right)) - f32::from(u8::from(left))) * config.velocity_multiplier;

        if self.won {
            ctx.object.set_position(config.win_point);
            return;
        }

        let position = ctx.object.position();
        let moved = Vec3::new(position.x + strafe, position.y, position.z + self.vertical_velocity);
        ctx.object.set_position(moved);
        if moved.x >= config.win_x {
            self.won = true;
            log::info!("'{}' reached the win line", ctx.object.name());
        }
    }

    fn on_trigger_volume_entered(&mut self, ctx: &mut ComponentContext<'_>, contact: &TriggerContact) {
        if self.won || self.lost {
            return;
        }
        let hazardous = ctx.world.get(contact.other).is_some_and(|other| {
            self.config
                .hazard_components
                .iter()
                .any(|name| other.has_component(name))
        });
        if hazardous {
            self.hit_pending = true;
        }
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.drag_float("Velocity", &mut self.config.velocity_multiplier);
        ui.drag_float("Jump Velocity", &mut self.config.jump_velocity);
        ui.label(&format!("Lives: {}", self.lives_left));
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for CharacterMovement {
    const TYPE_NAME: &'static str = "CharacterMovement";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        let mut movement: Self = from_payload(Self::TYPE_NAME, value)?;
        if value.get("lives_left").is_none() {
            movement.lives_left = movement.config.lives;
        }
        Ok(movement)
    }
}
