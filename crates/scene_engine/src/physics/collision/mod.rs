//! Collision geometry
//!
//! - [`primitives`] - world-space spheres, boxes and half-spaces
//! - [`shape`] - body-space colliders and their world-space form
//!
//! Colliders live in body space and are transformed to world space only
//! while testing, so moving a body never rewrites its shapes.

pub mod primitives;
pub mod shape;

pub use primitives::{Aabb, BoundingSphere, HalfSpace};
pub use shape::{Collider, ColliderShape, WorldSpaceShape};
