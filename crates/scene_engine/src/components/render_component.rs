//! Mesh + material pair drawn at the owner's world transform

use crate::assets::{Asset, AssetId, Material, Mesh};
use crate::editor::Inspector;
use crate::scene::component::{from_payload, to_payload};
use crate::scene::{Component, ComponentLoadContext, ComponentType, SceneError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RenderPayload {
    #[serde(default)]
    mesh: Option<AssetId>,
    #[serde(default)]
    material: Option<AssetId>,
}

/// Draws a mesh with a material
///
/// Both handles are shared with the resource manager; a component with
/// either handle missing draws nothing.
#[derive(Debug, Clone, Default)]
pub struct RenderComponent {
    mesh: Option<Arc<Mesh>>,
    material: Option<Arc<Material>>,
}

impl RenderComponent {
    /// Renderer for `mesh` with `material`
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
        }
    }

    /// Geometry
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    /// Shader and uniforms
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    /// Replace the geometry
    pub fn set_mesh(&mut self, mesh: Arc<Mesh>) {
        self.mesh = Some(mesh);
    }

    /// Replace the material
    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = Some(material);
    }
}

impl Component for RenderComponent {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        match &self.mesh {
            Some(mesh) => ui.label(&format!("Mesh: {} ({} triangles)", mesh.id(), mesh.triangle_count())),
            None => ui.label("Mesh: none"),
        }
        match &self.material {
            Some(material) => ui.label(&format!("Material: {}", material.name())),
            None => ui.label("Material: none"),
        }
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        let payload = RenderPayload {
            mesh: self.mesh.as_ref().map(|m| m.id()),
            material: self.material.as_ref().map(|m| m.id()),
        };
        to_payload(Self::TYPE_NAME, &payload)
    }
}

impl ComponentType for RenderComponent {
    const TYPE_NAME: &'static str = "RenderComponent";

    fn from_value(value: &serde_json::Value, ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        let payload: RenderPayload = from_payload(Self::TYPE_NAME, value)?;
        Ok(Self {
            mesh: payload.mesh.map(|id| ctx.asset::<Mesh>(id)).transpose()?,
            material: payload.material.map(|id| ctx.asset::<Material>(id)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MeshSource, ResourceManager};

    #[test]
    fn test_payload_references_asset_ids() {
        let mut resources = ResourceManager::default();
        let mesh = resources.create_asset::<Mesh>(MeshSource::unit_plane()).unwrap();
        let renderer = RenderComponent {
            mesh: Some(Arc::clone(&mesh)),
            material: None,
        };

        let value = renderer.to_value().unwrap();
        assert_eq!(value, serde_json::json!({ "mesh": mesh.id().raw(), "material": null }));

        let ctx = ComponentLoadContext::new(&resources);
        let back = RenderComponent::from_value(&value, &ctx).unwrap();
        assert!(Arc::ptr_eq(back.mesh().unwrap(), &mesh));
        assert!(back.material().is_none());
    }

    #[test]
    fn test_unknown_mesh_fails() {
        let resources = ResourceManager::default();
        let ctx = ComponentLoadContext::new(&resources);
        let err = RenderComponent::from_value(&serde_json::json!({ "mesh": 42 }), &ctx).unwrap_err();
        assert!(matches!(err, SceneError::MissingAsset { .. }));
    }
}
