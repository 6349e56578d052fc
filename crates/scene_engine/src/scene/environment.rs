//! Lights and render environment settings owned by a scene

use crate::assets::{ColorLut, ShaderProgram, TextureCube};
use crate::foundation::math::Vec3;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of light slots in a scene
pub const MAX_LIGHTS: usize = 8;

/// Point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// World position
    pub position: Vec3,
    /// Linear RGB colour
    pub color: Vec3,
    /// Distance at which the light fades out
    pub range: f32,
}

impl Light {
    /// Light at `position`
    pub fn new(position: Vec3, color: Vec3, range: f32) -> Self {
        Self { position, color, range }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::repeat(1.0), 10.0)
    }
}

bitflags! {
    /// Post-process switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct RenderFlags: u32 {
        /// Apply the colour lookup table
        const COLOR_CORRECTION = 1 << 0;
        /// Warm grading
        const WARM = 1 << 1;
        /// Cold grading
        const COLD = 1 << 2;
        /// Dumpster grading
        const DUMPSTER = 1 << 3;
    }
}

impl RenderFlags {
    /// Every flag with its display label, in panel order
    pub const LABELED: [(Self, &'static str); 4] = [
        (Self::COLOR_CORRECTION, "Enable Color Correction"),
        (Self::WARM, "Warm"),
        (Self::COLD, "Cold"),
        (Self::DUMPSTER, "Dumpster"),
    ];
}

/// Skybox cubemap drawn behind everything
#[derive(Debug, Clone)]
pub struct Skybox {
    /// Cubemap texture
    pub texture: Arc<TextureCube>,
    /// Shader drawing it
    pub shader: Arc<ShaderProgram>,
    /// Euler rotation in degrees
    pub rotation: Vec3,
}

/// Scene-wide render settings
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Optional skybox
    pub skybox: Option<Skybox>,
    /// Colour-correction lookup table
    pub color_lut: Option<Arc<ColorLut>>,
    /// Post-process switches
    pub flags: RenderFlags,
}
