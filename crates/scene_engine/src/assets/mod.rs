//! Asset management system
//!
//! Typed, shared-ownership assets (meshes, textures, shaders, colour lookup
//! tables and materials) created through the [`ResourceManager`]. Every
//! asset carries a generated [`AssetId`]; scenes reference assets by id and
//! the manager persists the id -> construction parameters mapping in a
//! manifest so the same set of assets can be rebuilt before a scene loads.

pub mod manifest;
pub mod material;
pub mod mesh;
pub mod obj_loader;
pub mod resource_manager;
pub mod shader;
pub mod texture;

pub use manifest::{AssetManifest, ManifestEntry, ManifestReport};
pub use material::{Material, MaterialParams, MaterialValue, RenderQueue, UniformParam};
pub use mesh::{Mesh, MeshSource, Vertex};
pub use obj_loader::{ObjError, ObjLoader};
pub use resource_manager::{LoadContext, ResourceConfig, ResourceManager};
pub use shader::{ShaderParams, ShaderProgram, ShaderStage};
pub use texture::{ColorLut, FilterMode, Texture2D, TextureCube, TextureParams, WrapMode};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Generated identifier of a loaded asset
///
/// Unique within one [`ResourceManager`] and preserved across manifest
/// save/load, so scene documents can refer to assets by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Kind tag written to the manifest for each asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// [`Texture2D`]
    Texture2D,
    /// [`TextureCube`]
    TextureCube,
    /// [`ColorLut`]
    ColorLut,
    /// [`ShaderProgram`]
    Shader,
    /// [`Mesh`]
    Mesh,
    /// [`Material`]
    Material,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Texture2D => "texture_2d",
            Self::TextureCube => "texture_cube",
            Self::ColorLut => "color_lut",
            Self::Shader => "shader",
            Self::Mesh => "mesh",
            Self::Material => "material",
        };
        f.write_str(name)
    }
}

/// Asset trait for loadable resources
///
/// `Params` is everything needed to construct the asset again; it is what
/// the manifest stores.
pub trait Asset: Send + Sync + Sized + 'static {
    /// Manifest kind tag
    const KIND: AssetKind;

    /// Construction parameters
    type Params: Clone + fmt::Debug + Serialize + DeserializeOwned;

    /// Build the asset from its parameters
    fn load(id: AssetId, params: &Self::Params, ctx: &LoadContext<'_>) -> Result<Self, AssetError>;

    /// Id assigned by the resource manager
    fn id(&self) -> AssetId;

    /// Parameters this asset was built from
    fn params(&self) -> Self::Params;

    /// Deduplication key; `None` means every request creates a new asset
    fn cache_key(_params: &Self::Params, _ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        Ok(None)
    }

    /// Source file recorded in the manifest, if the asset has one
    fn source_path(_params: &Self::Params) -> Option<String> {
        None
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset file not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Invalid asset data
    #[error("Invalid data in {path}: {reason}")]
    InvalidData {
        /// Offending file
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A referenced asset is not loaded
    #[error("{kind} {id} referenced by another asset is not loaded")]
    MissingDependency {
        /// Expected kind
        kind: AssetKind,
        /// Missing id
        id: AssetId,
    },

    /// Manifest document could not be read or written
    #[error("Manifest error in {path}: {reason}")]
    Manifest {
        /// Manifest file
        path: String,
        /// Failure description
        reason: String,
    },

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    pub(crate) fn invalid(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
