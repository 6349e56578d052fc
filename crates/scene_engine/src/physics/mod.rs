//! Physics bridge
//!
//! The scene talks to physics only through the [`PhysicsWorld`] trait: it
//! registers bodies, pushes object poses in, steps the simulation, reads
//! dynamic poses back and asks each trigger which bodies overlap it.
//! [`SimplePhysicsWorld`] is the built-in backend; any rigid-body library
//! can sit behind the same trait.

pub mod collision;
pub mod simple_world;

pub use collision::{Aabb, BoundingSphere, Collider, ColliderShape, HalfSpace, WorldSpaceShape};
pub use simple_world::SimplePhysicsWorld;

use crate::foundation::math::{Quat, Vec3};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque handle to a body inside a physics world
///
/// Handles are issued in increasing order, so sorted sets of handles
/// iterate in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Wrap a raw handle value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Never moves
    #[default]
    Static,
    /// Moved by its game object, pushes dynamic bodies
    Kinematic,
    /// Moved by the simulation
    Dynamic,
}

bitflags! {
    /// Physics debug visualisation switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DebugDrawMode: u32 {
        /// Collider outlines
        const WIREFRAME = 1 << 0;
        /// Bounding boxes
        const AABB = 1 << 1;
        /// Contact points
        const CONTACT_POINTS = 1 << 3;
        /// Constraints
        const CONSTRAINTS = 1 << 11;
        /// Surface normals
        const NORMALS = 1 << 14;
        /// Body frames
        const FRAMES = 1 << 15;
    }
}

impl DebugDrawMode {
    /// Every mode with its display label, in menu order
    pub const LABELED: [(Self, &'static str); 6] = [
        (Self::WIREFRAME, "Wireframe"),
        (Self::AABB, "AABB"),
        (Self::CONTACT_POINTS, "Contact Points"),
        (Self::CONSTRAINTS, "Constraints"),
        (Self::NORMALS, "Normals"),
        (Self::FRAMES, "Frames"),
    ];
}

/// Everything needed to add a body to a world
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    /// Simulation role
    pub kind: BodyKind,
    /// Triggers report overlaps and never collide
    pub is_trigger: bool,
    /// Shapes in body space
    pub colliders: Vec<Collider>,
    /// World position
    pub position: Vec3,
    /// World rotation
    pub rotation: Quat,
    /// World scale applied to the colliders
    pub scale: Vec3,
    /// Mass used for impulses (dynamic only)
    pub mass: f32,
    /// Multiplier on world gravity (dynamic only)
    pub gravity_scale: f32,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
}

impl BodyDesc {
    /// Static, non-trigger body at the origin
    pub fn new(kind: BodyKind, colliders: Vec<Collider>) -> Self {
        Self {
            kind,
            is_trigger: false,
            colliders,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::repeat(1.0),
            mass: 1.0,
            gravity_scale: 1.0,
            linear_velocity: Vec3::zeros(),
        }
    }

    /// Trigger volume
    pub fn trigger(colliders: Vec<Collider>) -> Self {
        Self {
            is_trigger: true,
            ..Self::new(BodyKind::Kinematic, colliders)
        }
    }

    /// Builder pattern: set the world pose
    pub fn with_pose(mut self, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
        self
    }
}

/// Physics collaborator interface
pub trait PhysicsWorld: Send + Sync {
    /// Register a body
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Remove a body; false if it was not registered
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// True if the handle is registered
    fn contains(&self, handle: BodyHandle) -> bool;

    /// Number of registered bodies
    fn body_count(&self) -> usize;

    /// Teleport a body
    fn set_pose(&mut self, handle: BodyHandle, position: Vec3, rotation: Quat, scale: Vec3);

    /// Current world position and rotation
    fn pose(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Current linear velocity
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    /// Overwrite the linear velocity
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    /// Apply an instantaneous impulse (dynamic bodies only)
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3);

    /// Advance the simulation
    fn step(&mut self, delta_time: f32);

    /// Non-trigger bodies currently overlapping a trigger
    fn overlapping(&self, trigger: BodyHandle) -> BTreeSet<BodyHandle>;

    /// Gravity acceleration
    fn gravity(&self) -> Vec3;

    /// Change gravity
    fn set_gravity(&mut self, gravity: Vec3);

    /// Active debug visualisation
    fn debug_draw_mode(&self) -> DebugDrawMode;

    /// Change debug visualisation
    fn set_debug_draw_mode(&mut self, mode: DebugDrawMode);
}
