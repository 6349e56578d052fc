//! Materials: a shader program plus named uniform values
//!
//! Material parameters refer to their shader and textures by [`AssetId`], so
//! the manifest can rebuild them after the assets they depend on. Loading a
//! material resolves those ids into shared handles; a dangling id is a
//! [`AssetError::MissingDependency`]. Materials are never deduplicated.

use super::{Asset, AssetError, AssetId, AssetKind, ColorLut, LoadContext, ShaderProgram, Texture2D, TextureCube};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which render pass draws the material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderQueue {
    /// Depth-tested, drawn front to back
    #[default]
    Opaque,
    /// Alpha blended, drawn after opaque geometry
    Transparent,
}

/// Serialisable uniform value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UniformParam {
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3([f32; 3]),
    /// 4-component vector or RGBA colour
    Vec4([f32; 4]),
    /// 2D texture by id
    Texture2D(AssetId),
    /// Cubemap by id
    TextureCube(AssetId),
    /// 3D lookup table by id
    ColorLut(AssetId),
}

/// Construction parameters for a [`Material`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    /// Display name
    pub name: String,
    /// Shader program id
    pub shader: AssetId,
    /// Render pass
    #[serde(default)]
    pub render_queue: RenderQueue,
    /// Uniform values keyed by uniform name
    #[serde(default)]
    pub uniforms: BTreeMap<String, UniformParam>,
}

impl MaterialParams {
    /// New material using `shader`
    pub fn new(name: impl Into<String>, shader: &Arc<ShaderProgram>) -> Self {
        Self {
            name: name.into(),
            shader: shader.id(),
            render_queue: RenderQueue::Opaque,
            uniforms: BTreeMap::new(),
        }
    }

    /// Builder pattern: choose the render pass
    pub fn with_render_queue(mut self, queue: RenderQueue) -> Self {
        self.render_queue = queue;
        self
    }

    /// Builder pattern: set a scalar uniform
    pub fn with_float(mut self, key: impl Into<String>, value: f32) -> Self {
        self.uniforms.insert(key.into(), UniformParam::Float(value));
        self
    }

    /// Builder pattern: set a vec3 uniform
    pub fn with_vec3(mut self, key: impl Into<String>, value: [f32; 3]) -> Self {
        self.uniforms.insert(key.into(), UniformParam::Vec3(value));
        self
    }

    /// Builder pattern: set a colour uniform
    pub fn with_color(mut self, key: impl Into<String>, rgba: [f32; 4]) -> Self {
        self.uniforms.insert(key.into(), UniformParam::Vec4(rgba));
        self
    }

    /// Builder pattern: bind a 2D texture
    pub fn with_texture(mut self, key: impl Into<String>, texture: &Arc<Texture2D>) -> Self {
        self.uniforms.insert(key.into(), UniformParam::Texture2D(texture.id()));
        self
    }

    /// Builder pattern: bind a cubemap
    pub fn with_cubemap(mut self, key: impl Into<String>, texture: &Arc<TextureCube>) -> Self {
        self.uniforms.insert(key.into(), UniformParam::TextureCube(texture.id()));
        self
    }

    /// Builder pattern: bind a 3D lookup table
    pub fn with_lut(mut self, key: impl Into<String>, lut: &Arc<ColorLut>) -> Self {
        self.uniforms.insert(key.into(), UniformParam::ColorLut(lut.id()));
        self
    }
}

/// Resolved uniform value
#[derive(Debug, Clone)]
pub enum MaterialValue {
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3([f32; 3]),
    /// 4-component vector or RGBA colour
    Vec4([f32; 4]),
    /// 2D texture
    Texture2D(Arc<Texture2D>),
    /// Cubemap
    TextureCube(Arc<TextureCube>),
    /// 3D lookup table
    ColorLut(Arc<ColorLut>),
}

/// Shader program plus uniform bindings
#[derive(Debug)]
pub struct Material {
    id: AssetId,
    params: MaterialParams,
    shader: Arc<ShaderProgram>,
    values: BTreeMap<String, MaterialValue>,
}

impl Material {
    /// Display name
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// Shader program
    pub fn shader(&self) -> &Arc<ShaderProgram> {
        &self.shader
    }

    /// Render pass
    pub fn render_queue(&self) -> RenderQueue {
        self.params.render_queue
    }

    /// Look up one uniform
    pub fn get(&self, key: &str) -> Option<&MaterialValue> {
        self.values.get(key)
    }

    /// All uniforms in key order
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &MaterialValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn resolve<T: Asset>(ctx: &LoadContext<'_>, id: AssetId) -> Result<Arc<T>, AssetError> {
    ctx.resources()
        .get::<T>(id)
        .ok_or(AssetError::MissingDependency { kind: T::KIND, id })
}

impl Asset for Material {
    const KIND: AssetKind = AssetKind::Material;
    type Params = MaterialParams;

    fn load(id: AssetId, params: &MaterialParams, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        let shader = resolve::<ShaderProgram>(ctx, params.shader)?;

        let mut values = BTreeMap::new();
        for (key, param) in &params.uniforms {
            let value = match param {
                UniformParam::Float(v) => MaterialValue::Float(*v),
                UniformParam::Vec3(v) => MaterialValue::Vec3(*v),
                UniformParam::Vec4(v) => MaterialValue::Vec4(*v),
                UniformParam::Texture2D(tex) => MaterialValue::Texture2D(resolve(ctx, *tex)?),
                UniformParam::TextureCube(tex) => MaterialValue::TextureCube(resolve(ctx, *tex)?),
                UniformParam::ColorLut(lut) => MaterialValue::ColorLut(resolve(ctx, *lut)?),
            };
            values.insert(key.clone(), value);
        }

        log::debug!("Created material '{}' ({} uniforms)", params.name, values.len());
        Ok(Self {
            id,
            params: params.clone(),
            shader,
            values,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> MaterialParams {
        self.params.clone()
    }
}
