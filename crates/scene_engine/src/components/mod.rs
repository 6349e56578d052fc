//! Built-in components
//!
//! Every gameplay constant lives in a per-instance config struct with the
//! shipped value as its default, so levels and config files can tune them.

pub mod camera;
pub mod camera_control;
pub mod character_movement;
pub mod enemy_patrol;
pub mod jump;
pub mod material_swap;
pub mod render_component;
pub mod rigid_body;
pub mod rotating;
pub mod trigger_enter;

pub use camera::Camera;
pub use camera_control::{CameraControlConfig, SimpleCameraControl};
pub use character_movement::{CharacterMovement, CharacterMovementConfig};
pub use enemy_patrol::{EnemyPatrol, EnemyPatrolConfig, PatrolLeg};
pub use jump::{JumpBehaviour, JumpConfig};
pub use material_swap::MaterialSwapBehaviour;
pub use render_component::RenderComponent;
pub use rigid_body::{RigidBody, TriggerVolume};
pub use rotating::{RotatingBehaviour, RotatingConfig};
pub use trigger_enter::TriggerVolumeEnterBehaviour;

use crate::scene::ComponentRegistry;

/// Register every built-in component type
pub fn register_builtin(registry: &mut ComponentRegistry) {
    registry
        .register::<Camera>()
        .register::<RenderComponent>()
        .register::<RotatingBehaviour>()
        .register::<JumpBehaviour>()
        .register::<CharacterMovement>()
        .register::<EnemyPatrol>()
        .register::<MaterialSwapBehaviour>()
        .register::<TriggerVolumeEnterBehaviour>()
        .register::<SimpleCameraControl>()
        .register::<RigidBody>()
        .register::<TriggerVolume>();
}
