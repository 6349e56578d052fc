//! Back-and-forth patrol between two waypoints
//!
//! The enemy walks a fixed number of steps per leg; at the end of a leg it
//! snaps exactly onto the waypoint and turns around. Steps are per tick.

use crate::editor::Inspector;
use crate::foundation::math::Vec3;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentContext, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};

/// Options for [`EnemyPatrol`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyPatrolConfig {
    /// First waypoint
    pub waypoint_a: Vec3,
    /// Second waypoint
    pub waypoint_b: Vec3,
    /// Distance covered per tick
    pub step: f32,
    /// Ticks per leg
    pub steps_per_leg: u32,
    /// Rotation while walking towards `waypoint_a`
    pub facing_to_a: Vec3,
    /// Rotation while walking towards `waypoint_b`
    pub facing_to_b: Vec3,
}

impl Default for EnemyPatrolConfig {
    fn default() -> Self {
        Self {
            waypoint_a: Vec3::new(10.0, 0.0, 3.2),
            waypoint_b: Vec3::new(20.0, 0.0, 3.2),
            step: 0.05,
            steps_per_leg: 200,
            facing_to_a: Vec3::new(90.0, 0.0, -90.0),
            facing_to_b: Vec3::new(90.0, 0.0, 90.0),
        }
    }
}

/// Waypoint currently walked towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolLeg {
    /// Heading for `waypoint_a`
    #[default]
    ToA,
    /// Heading for `waypoint_b`
    ToB,
}

/// Patrolling enemy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyPatrol {
    /// Options
    #[serde(flatten)]
    pub config: EnemyPatrolConfig,
    walk_counter: u32,
    leg: PatrolLeg,
}

impl EnemyPatrol {
    /// Patrol starting towards `waypoint_a`
    pub fn new(config: EnemyPatrolConfig) -> Self {
        Self {
            config,
            walk_counter: 0,
            leg: PatrolLeg::ToA,
        }
    }

    /// Steps taken on the current leg
    pub fn walk_counter(&self) -> u32 {
        self.walk_counter
    }

    /// Current leg
    pub fn leg(&self) -> PatrolLeg {
        self.leg
    }

    fn target(&self) -> Vec3 {
        match self.leg {
            PatrolLeg::ToA => self.config.waypoint_a,
            PatrolLeg::ToB => self.config.waypoint_b,
        }
    }
}

impl Component for EnemyPatrol {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.walk_counter >= self.config.steps_per_leg {
            ctx.object.set_position(self.target());
            self.leg = match self.leg {
                PatrolLeg::ToA => PatrolLeg::ToB,
                PatrolLeg::ToB => PatrolLeg::ToA,
            };
            self.walk_counter = 0;
        }

        let (from, to, facing) = match self.leg {
            PatrolLeg::ToA => (self.config.waypoint_b, self.config.waypoint_a, self.config.facing_to_a),
            PatrolLeg::ToB => (self.config.waypoint_a, self.config.waypoint_b, self.config.facing_to_b),
        };
        let direction = (to - from).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);

        ctx.object.set_rotation(facing);
        ctx.object.set_position(ctx.object.position() + direction * self.config.step);
        self.walk_counter += 1;
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        ui.label(&format!("Walk Counter: {} ({:?})", self.walk_counter, self.leg));
        ui.drag_float("Step", &mut self.config.step);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        to_payload(Self::TYPE_NAME, self)
    }
}

impl ComponentType for EnemyPatrol {
    const TYPE_NAME: &'static str = "EnemyPatrol";

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

    fn patrol(steps_per_leg: u32) -> EnemyPatrol {
        EnemyPatrol::new(EnemyPatrolConfig {
            waypoint_a: Vec3::new(0.0, 0.0, 1.0),
            waypoint_b: Vec3::new(4.0, 0.0, 1.0),
            step: 1.0,
            steps_per_leg,
            ..EnemyPatrolConfig::default()
        })
    }

    #[test]
    fn test_walks_towards_a_then_turns_around() {
        let mut scene = Scene::new();
        let id = scene.create_game_object("Turtle");
        {
            let object = scene.object_mut(id).unwrap();
            object.set_position(Vec3::new(4.0, 0.0, 1.0));
            object.add(patrol(4)).unwrap();
        }

        for _ in 0..4 {
            scene.update(0.016, &InputSnapshot::empty());
        }
        let object = scene.object(id).unwrap();
        assert_relative_eq!(object.position(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(object.rotation(), Vec3::new(90.0, 0.0, -90.0));

        scene.update(0.016, &InputSnapshot::empty());
        let object = scene.object(id).unwrap();
        assert_relative_eq!(object.position(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(object.rotation(), Vec3::new(90.0, 0.0, 90.0));
        assert_eq!(object.get::<EnemyPatrol>().unwrap().leg(), PatrolLeg::ToB);
        assert_eq!(object.get::<EnemyPatrol>().unwrap().walk_counter(), 1);
    }

    #[test]
    fn test_leg_end_snaps_onto_waypoint() {
        let mut scene = Scene::new();
        let id = scene.create_game_object("Turtle");
        {
            let object = scene.object_mut(id).unwrap();
            // Off the path: the snap pulls it back
            object.set_position(Vec3::new(4.0, 2.0, 1.0));
            object.add(patrol(2)).unwrap();
        }
        for _ in 0..3 {
            scene.update(0.016, &InputSnapshot::empty());
        }
        assert_relative_eq!(scene.object(id).unwrap().position(), Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_state_round_trips() {
        let mut enemy = EnemyPatrol::default();
        enemy.walk_counter = 57;
        enemy.leg = PatrolLeg::ToB;
        let value = enemy.to_value().unwrap();
        assert_eq!(value["walk_counter"], 57);
        assert_eq!(value["leg"], "to_b");

        let resources = crate::assets::ResourceManager::default();
        let back = EnemyPatrol::from_value(&value, &ComponentLoadContext::new(&resources)).unwrap();
        assert_eq!(back, enemy);
    }
}
