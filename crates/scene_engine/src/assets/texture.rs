//! Texture assets: 2D textures, cubemaps and 3D colour lookup tables
//!
//! Pixel decoding belongs to the graphics backend; at this layer a texture
//! is validated (header decodes, dimensions known) and remembered together
//! with its sampling parameters.

use super::{Asset, AssetError, AssetId, AssetKind, LoadContext};
use serde::{Deserialize, Serialize};

/// Texture coordinate wrap behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Tile the texture
    #[default]
    Repeat,
    /// Tile with mirroring
    MirroredRepeat,
    /// Clamp to the border texel
    ClampToEdge,
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Bilinear with mipmaps
    #[default]
    Linear,
}

/// Construction parameters shared by file-backed textures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureParams {
    /// Path relative to the asset root
    pub path: String,
    /// Wrap mode on both axes
    #[serde(default)]
    pub wrap: WrapMode,
    /// Min/mag filter
    #[serde(default)]
    pub filter: FilterMode,
}

impl TextureParams {
    /// Parameters for a file with default sampling
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            wrap: WrapMode::default(),
            filter: FilterMode::default(),
        }
    }

    /// Builder pattern: set wrap mode
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Builder pattern: set filter mode
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

impl From<&str> for TextureParams {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn read_dimensions(params: &TextureParams, ctx: &LoadContext<'_>) -> Result<(u32, u32), AssetError> {
    let path = ctx.existing_path(&params.path)?;
    image::image_dimensions(&path).map_err(|e| AssetError::invalid(path.display(), e.to_string()))
}

fn texture_cache_key(params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
    Ok(Some(ctx.canonical_path(&params.path)?.display().to_string()))
}

/// A 2D texture (also used for 1D ramps such as toon-shading lookups)
#[derive(Debug)]
pub struct Texture2D {
    id: AssetId,
    params: TextureParams,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Wrap mode
    pub fn wrap(&self) -> WrapMode {
        self.params.wrap
    }

    /// Source path as requested
    pub fn path(&self) -> &str {
        &self.params.path
    }
}

impl Asset for Texture2D {
    const KIND: AssetKind = AssetKind::Texture2D;
    type Params = TextureParams;

    fn load(id: AssetId, params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        let (width, height) = read_dimensions(params, ctx)?;
        log::debug!("Loaded texture {} ({}x{})", params.path, width, height);
        Ok(Self {
            id,
            params: params.clone(),
            width,
            height,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> TextureParams {
        self.params.clone()
    }

    fn cache_key(params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        texture_cache_key(params, ctx)
    }

    fn source_path(params: &TextureParams) -> Option<String> {
        Some(params.path.clone())
    }
}

/// A cubemap used for skyboxes, stored as a single cross-layout image
#[derive(Debug)]
pub struct TextureCube {
    id: AssetId,
    params: TextureParams,
    face_size: u32,
}

impl TextureCube {
    /// Edge length of one face in texels
    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    /// Source path as requested
    pub fn path(&self) -> &str {
        &self.params.path
    }
}

impl Asset for TextureCube {
    const KIND: AssetKind = AssetKind::TextureCube;
    type Params = TextureParams;

    fn load(id: AssetId, params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        let (width, height) = read_dimensions(params, ctx)?;
        // Horizontal cross is 4x3 faces, vertical cross 3x4; a lone square is a single face.
        let face_size = if width == height { width } else { width.max(height) / 4 };
        if face_size == 0 {
            return Err(AssetError::invalid(&params.path, "cubemap image is empty"));
        }
        Ok(Self {
            id,
            params: params.clone(),
            face_size,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> TextureParams {
        self.params.clone()
    }

    fn cache_key(params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        texture_cache_key(params, ctx)
    }

    fn source_path(params: &TextureParams) -> Option<String> {
        Some(params.path.clone())
    }
}

/// A 3D colour-correction lookup table read from a `.cube` file
#[derive(Debug)]
pub struct ColorLut {
    id: AssetId,
    params: TextureParams,
    size: u32,
    entries: Vec<[f32; 3]>,
}

impl ColorLut {
    /// Edge length of the LUT cube
    pub fn size(&self) -> u32 {
        self.size
    }

    /// RGB entries, red varying fastest
    pub fn entries(&self) -> &[[f32; 3]] {
        &self.entries
    }

    /// Source path as requested
    pub fn path(&self) -> &str {
        &self.params.path
    }

    fn parse(path: &str, contents: &str) -> Result<(u32, Vec<[f32; 3]>), AssetError> {
        let mut size = None;
        let mut entries = Vec::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("LUT_3D_SIZE") => {
                    let value = parts
                        .next()
                        .and_then(|v| v.parse::<u32>().ok())
                        .ok_or_else(|| AssetError::invalid(path, "bad LUT_3D_SIZE"))?;
                    size = Some(value);
                }
                Some("TITLE" | "DOMAIN_MIN" | "DOMAIN_MAX" | "LUT_1D_SIZE" | "LUT_3D_INPUT_RANGE") => {}
                Some(first) => {
                    let values = std::iter::once(first)
                        .chain(parts)
                        .map(str::parse::<f32>)
                        .collect::<Result<Vec<_>, _>>()
                        .ok()
                        .filter(|values| values.len() == 3)
                        .ok_or_else(|| AssetError::invalid(path, format!("bad LUT entry '{line}'")))?;
                    entries.push([values[0], values[1], values[2]]);
                }
                None => {}
            }
        }

        let size = size.ok_or_else(|| AssetError::invalid(path, "missing LUT_3D_SIZE"))?;
        let expected = (size as usize).pow(3);
        if size < 2 || entries.len() != expected {
            return Err(AssetError::invalid(
                path,
                format!("expected {} entries for size {}, found {}", expected, size, entries.len()),
            ));
        }
        Ok((size, entries))
    }
}

impl Asset for ColorLut {
    const KIND: AssetKind = AssetKind::ColorLut;
    type Params = TextureParams;

    fn load(id: AssetId, params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Self, AssetError> {
        let path = ctx.existing_path(&params.path)?;
        let contents = std::fs::read_to_string(&path)?;
        let (size, entries) = Self::parse(&params.path, &contents)?;
        log::debug!("Loaded colour LUT {} (size {})", params.path, size);
        Ok(Self {
            id,
            params: params.clone(),
            size,
            entries,
        })
    }

    fn id(&self) -> AssetId {
        self.id
    }

    fn params(&self) -> TextureParams {
        self.params.clone()
    }

    fn cache_key(params: &TextureParams, ctx: &LoadContext<'_>) -> Result<Option<String>, AssetError> {
        texture_cache_key(params, ctx)
    }

    fn source_path(params: &TextureParams) -> Option<String> {
        Some(params.path.clone())
    }
}
