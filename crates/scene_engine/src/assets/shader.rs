//! Shader program assets
//!
//! Compilation happens in the graphics backend. Here a program is the set of
//! stage sources read from disk, deduplicated by the set of stage paths.

use super::{Asset, AssetError, AssetId, AssetKind, LoadContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
}

/// Stage -> source path mapping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShaderParams {
    /// Source file per stage, relative to the asset root
    pub stages: BTreeMap<ShaderStage, String>,
    /// Name shown in debug tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_name: Option<String>,
}

impl ShaderParams {
    /// Vertex + fragment program
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        let mut stages = BTreeMap::new();
        stages.insert(ShaderStage::Vertex, vertex.into());
        stages.insert(ShaderStage::Fragment, fragment.into());
        Self { stages, debug_name: None }
    }

    /// Builder pattern: add or replace a stage
    pub fn with_stage(mut self, stage: ShaderStage, path: impl Into<String>) -> Self {
        self.stages.insert(stage, path.into());
        self
    }

    /// Builder pattern: set the debug name
    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = Some(name.into());
        self
    }
}

/// A linked set of shader stage sources
#[derive(Debug)]
pub struct ShaderProgram {
    id: AssetId,
    params: ShaderParams,
    sources: BTreeMap<ShaderStage, String>,
}

impl ShaderProgram {
    /// Source text of one stage
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        self.sources.get(&stage).map(String::as_str)
    }

    /// Name shown in debug tools
    pub fn debug_name(&self) -> Option<&str> {
        self.params.debug_name.as_deref()
    }

    /// Stages present in this program
    pub fn stages(&self) -> impl Iterator<Item = ShaderStage> + '_ {
        self.sources.keys().copied()
    }
}

impl Asset for ShaderProgram {
    const KIND: AssetKind = AssetKind::Shader;
    type Params = ShaderParams;

    fn load(id: AssetId, params: &ShaderParams, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        if !params.stages.contains_key(&ShaderStage::Vertex) || !params.stages.contains_key(&ShaderStage::Fragment) {
            return Err(AssetError::invalid(
                params.debug_name.as_deref().unwrap_or("shader"),
                "a program needs both vertex and fragment stages",
            ));
        }

        let mut sources = BTreeMap::new();
        for (stage, path) in &params.stages {
            let source = std::fs::read_to_string(ctx.existing_path(path)?)?;
            if source.trim().is_empty() {
                return Err(AssetError::invalid(path, "shader source is empty"));
            }
            sources.insert(*stage, source);
        }

        log::debug!(
            "Loaded shader program {} ({} stages)",
            params.debug_name.as_deref().unwrap_or("<unnamed>"),
            sources.len()
        );
        Ok(Self {
            id,
            params: params.clone(),
            sources,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> ShaderParams {
        self.params.clone()
    }

    fn cache_key(params: &ShaderParams, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        let mut key = String::new();
        for (stage, path) in &params.stages {
            key.push_str(&format!("{:?}={};", stage, ctx.canonical_path(path)?.display()));
        }
        Ok(Some(key))
    }

    fn source_path(params: &ShaderParams) -> Option<String> {
        params.stages.get(&ShaderStage::Fragment).cloned()
    }
}
