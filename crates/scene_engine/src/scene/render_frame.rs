//! Per-frame data handed to a renderer
//!
//! The scene never draws; it flattens itself into a [`RenderFrame`] that a
//! graphics backend consumes.

use super::environment::{Light, RenderFlags, Skybox};
use super::game_object::GameObjectId;
use crate::assets::{ColorLut, Material, Mesh};
use crate::foundation::math::{Mat4, Vec3};
use crate::physics::DebugDrawMode;
use std::sync::Arc;

/// One mesh to draw
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Object the draw came from
    pub object: GameObjectId,
    /// Geometry
    pub mesh: Arc<Mesh>,
    /// Shader and uniforms
    pub material: Arc<Material>,
    /// Model matrix
    pub transform: Mat4,
}

/// Everything a backend needs for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    /// Opaque pass, creation order
    pub opaque: Vec<DrawItem>,
    /// Alpha-blended pass, creation order
    pub transparent: Vec<DrawItem>,
    /// World -> camera
    pub view: Mat4,
    /// Camera -> clip
    pub projection: Mat4,
    /// Camera world position
    pub camera_position: Vec3,
    /// Skybox, if any
    pub skybox: Option<Skybox>,
    /// Lookup table for colour correction
    pub color_lut: Option<Arc<ColorLut>>,
    /// Post-process switches
    pub flags: RenderFlags,
    /// Active lights
    pub lights: Vec<Light>,
    /// Physics debug visualisation
    pub debug_draw: DebugDrawMode,
}

impl RenderFrame {
    /// Total number of draw items
    pub fn draw_count(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }
}
