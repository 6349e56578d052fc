//! Asset manifest document
//!
//! Records every asset a [`ResourceManager`](super::ResourceManager) created:
//! id, kind, source file (if any) and the full construction parameters. The
//! manifest is written as JSON next to the scene document.

use super::{AssetError, AssetId, AssetKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current manifest format version
pub const MANIFEST_VERSION: u32 = 1;

/// One asset's construction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Asset kind
    pub kind: AssetKind,
    /// Source file relative to the asset root, for file-backed assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Kind-specific construction parameters
    pub params: serde_json::Value,
}

impl ManifestEntry {
    /// Kind plus source file, for log and error messages
    pub fn describe(&self) -> String {
        match &self.source {
            Some(source) => format!("{} '{}'", self.kind, source),
            None => self.kind.to_string(),
        }
    }
}

/// Id -> construction record mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Format version
    pub version: u32,
    /// Entries in ascending id order
    pub assets: BTreeMap<AssetId, ManifestEntry>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            assets: BTreeMap::new(),
        }
    }
}

impl AssetManifest {
    /// Read a manifest from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| manifest_error(path, e))?;
        let manifest: Self = serde_json::from_str(&contents).map_err(|e| manifest_error(path, e))?;
        if manifest.version > MANIFEST_VERSION {
            return Err(manifest_error(
                path,
                format!("unsupported manifest version {}", manifest.version),
            ));
        }
        Ok(manifest)
    }

    /// Write the manifest as pretty-printed JSON
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self).map_err(|e| manifest_error(path, e))?;
        std::fs::write(path, contents).map_err(|e| manifest_error(path, e))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when no assets are recorded
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn manifest_error(path: &Path, reason: impl ToString) -> AssetError {
    AssetError::Manifest {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Outcome of loading a manifest
///
/// Loading never stops at the first bad asset: each failure is recorded here
/// and the remaining entries still load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    /// Assets created from the manifest
    pub loaded: Vec<AssetId>,
    /// Entries whose id was already present in the manager
    pub skipped: Vec<AssetId>,
    /// Entries that failed, with the reason
    pub failed: Vec<(AssetId, String)>,
}

impl ManifestReport {
    /// True when every entry either loaded or was already present
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
