//! Serialized scene layout
//!
//! The document is plain data: assets are referenced by [`AssetId`] and
//! objects by [`ObjectGuid`]. Object order is creation order and component
//! order is attachment order; both are significant.

use super::environment::{Light, RenderFlags};
use super::game_object::ObjectGuid;
use super::SceneError;
use crate::assets::AssetId;
use crate::foundation::math::Vec3;
use crate::physics::DebugDrawMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current document version
pub const SCENE_VERSION: u32 = 1;

fn default_enabled() -> bool {
    true
}

fn default_scale() -> Vec3 {
    Vec3::repeat(1.0)
}

/// Whole scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version
    pub version: u32,
    /// Skybox references
    #[serde(default)]
    pub skybox: Option<SkyboxRecord>,
    /// Colour lookup table
    #[serde(default)]
    pub color_lut: Option<AssetId>,
    /// Object carrying the main camera
    pub main_camera: ObjectGuid,
    /// Post-process switches
    #[serde(default)]
    pub render_flags: RenderFlags,
    /// Physics debug visualisation
    #[serde(default)]
    pub physics_debug_mode: DebugDrawMode,
    /// Lights in slot order
    #[serde(default)]
    pub lights: Vec<Light>,
    /// Objects in creation order
    pub objects: Vec<GameObjectRecord>,
}

/// Skybox references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxRecord {
    /// Cubemap texture
    pub texture: AssetId,
    /// Skybox shader
    pub shader: AssetId,
    /// Euler rotation in degrees
    #[serde(default = "Vec3::zeros")]
    pub rotation: Vec3,
}

/// One game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObjectRecord {
    /// Persistent id
    pub guid: ObjectGuid,
    /// Display name
    pub name: String,
    /// Local position
    #[serde(default = "Vec3::zeros")]
    pub position: Vec3,
    /// Local Euler rotation in degrees
    #[serde(default = "Vec3::zeros")]
    pub rotation: Vec3,
    /// Local scale
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Parent object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectGuid>,
    /// Components in attachment order
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// One attached component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Registered type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the component receives hooks
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Type-specific data
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SceneDocument {
    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        serde_json::from_str(text).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Pretty JSON text
    pub fn to_json(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Read a document file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SceneError::Serialization(format!("{}: {e}", path.display())))
    }

    /// Write a document file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let doc = SceneDocument::from_json(
            r#"{
                "version": 1,
                "main_camera": 1,
                "objects": [
                    { "guid": 1, "name": "Main Camera", "components": [ { "type": "Camera" } ] }
                ]
            }"#,
        )
        .unwrap();

        let camera = &doc.objects[0];
        assert_eq!(camera.scale, Vec3::repeat(1.0));
        assert_eq!(camera.parent, None);
        assert!(camera.components[0].enabled);
        assert_eq!(camera.components[0].payload, serde_json::Value::Null);
        assert!(doc.lights.is_empty());
        assert!(doc.skybox.is_none());
    }

    #[test]
    fn test_malformed_document_is_serialization_error() {
        assert!(matches!(
            SceneDocument::from_json("{ \"version\": 1 "),
            Err(SceneError::Serialization(_))
        ));
    }
}
