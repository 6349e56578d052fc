//! Resource Manager - typed asset creation, caching and manifest persistence
//!
//! Owns one store per asset type, keyed by [`AssetId`]. Path-identified
//! assets (textures, meshes from files, shaders) are deduplicated by their
//! canonical path, so asking twice for the same file hands back the same
//! `Arc`. Materials and generated meshes always create a new asset.
//!
//! Every created asset is recorded as a [`ManifestEntry`]; `save_manifest`
//! writes them out and `load_manifest` rebuilds them, preserving ids, so a
//! scene document that references assets by id can be loaded afterwards.
//!
//! The manager is mutated only while building or loading; from the
//! simulation's point of view the stored assets are read-only.

use super::manifest::{AssetManifest, ManifestEntry, ManifestReport};
use super::{Asset, AssetError, AssetId, AssetKind, ColorLut, Material, Mesh, ShaderProgram, Texture2D, TextureCube};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the Resource Manager
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Directory relative asset paths are resolved against
    pub asset_root: PathBuf,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
        }
    }
}

type Store<T> = BTreeMap<AssetId, Arc<T>>;

/// Context handed to [`Asset::load`]
pub struct LoadContext<'a> {
    root: &'a Path,
    resources: &'a ResourceManager,
}

impl<'a> LoadContext<'a> {
    /// Asset root directory
    pub fn root(&self) -> &Path {
        self.root
    }

    /// Already-loaded assets, for resolving dependencies
    pub fn resources(&self) -> &'a ResourceManager {
        self.resources
    }

    /// Resolve a path against the asset root without touching the disk
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Resolve a path and require that it exists
    pub fn existing_path(&self, path: &str) -> Result<PathBuf, AssetError> {
        let resolved = self.resolve(path);
        if resolved.is_file() {
            Ok(resolved)
        } else {
            Err(AssetError::NotFound(resolved.display().to_string()))
        }
    }

    /// Canonical absolute path, used as the deduplication key
    pub fn canonical_path(&self, path: &str) -> Result<PathBuf, AssetError> {
        let resolved = self.resolve(path);
        std::fs::canonicalize(&resolved).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(resolved.display().to_string()),
            _ => AssetError::Io(e),
        })
    }
}

/// Central asset factory and cache
pub struct ResourceManager {
    config: ResourceConfig,
    /// `TypeId::of::<T>()` -> `Store<T>`
    stores: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    /// (kind, canonical key) -> id, for deduplicated kinds only
    cache: HashMap<(AssetKind, String), AssetId>,
    entries: BTreeMap<AssetId, ManifestEntry>,
    /// Manifest entries that could not be rebuilt, with the reason
    failures: BTreeMap<AssetId, String>,
    next_id: u64,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(ResourceConfig::default())
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("asset_root", &self.config.asset_root)
            .field("assets", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl ResourceManager {
    /// Create an empty manager
    pub fn new(config: ResourceConfig) -> Self {
        log::debug!("Resource manager rooted at {}", config.asset_root.display());
        Self {
            config,
            stores: HashMap::new(),
            cache: HashMap::new(),
            entries: BTreeMap::new(),
            failures: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create an empty manager rooted at `asset_root`
    pub fn with_root(asset_root: impl Into<PathBuf>) -> Self {
        Self::new(ResourceConfig {
            asset_root: asset_root.into(),
        })
    }

    /// Asset root directory
    pub fn asset_root(&self) -> &Path {
        &self.config.asset_root
    }

    /// Create (or fetch the cached instance of) an asset
    pub fn create_asset<T: Asset>(&mut self, params: T::Params) -> Result<Arc<T>, AssetError> {
        let id = AssetId::new(self.next_id);
        let (key, asset) = {
            let ctx = self.context();
            let key = T::cache_key(&params, &ctx)?;
            if let Some(existing) = key.as_ref().and_then(|k| self.cached::<T>(k)) {
                log::trace!("Cache hit for {} {}", T::KIND, existing.id());
                return Ok(existing);
            }
            (key, T::load(id, &params, &ctx)?)
        };

        self.next_id += 1;
        self.insert(id, key, &params, asset)
    }

    /// Look up a loaded asset by id
    pub fn get<T: Asset>(&self, id: AssetId) -> Option<Arc<T>> {
        self.store::<T>()?.get(&id).cloned()
    }

    /// Kind of a loaded asset
    pub fn kind_of(&self, id: AssetId) -> Option<AssetKind> {
        self.entries.get(&id).map(|entry| entry.kind)
    }

    /// True if an asset with this id is loaded
    pub fn contains(&self, id: AssetId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Why a manifest entry with this id failed to load, if it did
    ///
    /// Failures caused by a missing dependency include the dependency's own
    /// reason, so the message always ends at the offending file.
    pub fn failure(&self, id: AssetId) -> Option<&str> {
        self.failures.get(&id).map(String::as_str)
    }

    /// Number of loaded assets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of every loaded asset in ascending order
    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.entries.keys().copied()
    }

    /// Snapshot of the current id -> parameters mapping
    pub fn manifest(&self) -> AssetManifest {
        AssetManifest {
            assets: self.entries.clone(),
            ..AssetManifest::default()
        }
    }

    /// Persist the manifest of every loaded asset
    pub fn save_manifest(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        self.manifest().write(path)?;
        log::info!("Saved asset manifest with {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Rebuild the assets listed in a manifest file
    ///
    /// Only an unreadable or malformed manifest is an error. Individual
    /// assets that fail are logged and reported; assets depending on them
    /// fail in turn, everything else still loads.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<ManifestReport, AssetError> {
        let path = path.as_ref();
        let manifest = AssetManifest::read(path)?;
        let report = self.apply_manifest(&manifest);
        log::info!(
            "Loaded manifest {}: {} loaded, {} already present, {} failed",
            path.display(),
            report.loaded.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Rebuild the assets of an in-memory manifest, ascending by id
    pub fn apply_manifest(&mut self, manifest: &AssetManifest) -> ManifestReport {
        let mut report = ManifestReport::default();

        for (&id, entry) in &manifest.assets {
            self.next_id = self.next_id.max(id.raw() + 1);

            match self.entries.get(&id) {
                Some(present) if present == entry => {
                    report.skipped.push(id);
                    continue;
                }
                Some(present) => {
                    log::warn!("Conflicting id {}: have {}, manifest has {}", id, present.describe(), entry.describe());
                    report
                        .failed
                        .push((id, format!("conflicting id: already loaded as {}", present.describe())));
                    continue;
                }
                None => {}
            }

            let result = match entry.kind {
                AssetKind::Texture2D => self.restore::<Texture2D>(id, entry),
                AssetKind::TextureCube => self.restore::<TextureCube>(id, entry),
                AssetKind::ColorLut => self.restore::<ColorLut>(id, entry),
                AssetKind::Shader => self.restore::<ShaderProgram>(id, entry),
                AssetKind::Mesh => self.restore::<Mesh>(id, entry),
                AssetKind::Material => self.restore::<Material>(id, entry),
            };

            match result {
                Ok(()) => {
                    self.failures.remove(&id);
                    report.loaded.push(id);
                }
                Err(e) => {
                    let reason = self.failure_reason(entry, &e);
                    log::warn!("Skipping {} {}: {}", entry.kind, id, reason);
                    self.failures.insert(id, reason.clone());
                    report.failed.push((id, reason));
                }
            }
        }

        report
    }

    fn failure_reason(&self, entry: &ManifestEntry, error: &AssetError) -> String {
        match error {
            AssetError::MissingDependency { id, .. } => match self.failure(*id) {
                Some(cause) => format!("{}: {} ({})", entry.describe(), error, cause),
                None => format!("{}: {}", entry.describe(), error),
            },
            _ => format!("{}: {}", entry.describe(), error),
        }
    }

    fn restore<T: Asset>(&mut self, id: AssetId, entry: &ManifestEntry) -> Result<(), AssetError> {
        let params: T::Params = serde_json::from_value(entry.params.clone())
            .map_err(|e| AssetError::invalid(format!("manifest entry {id}"), e.to_string()))?;
        let (key, asset) = {
            let ctx = self.context();
            let key = T::cache_key(&params, &ctx)?;
            (key, T::load(id, &params, &ctx)?)
        };
        self.insert(id, key, &params, asset).map(|_| ())
    }

    fn context(&self) -> LoadContext<'_> {
        LoadContext {
            root: &self.config.asset_root,
            resources: self,
        }
    }

    fn insert<T: Asset>(
        &mut self,
        id: AssetId,
        key: Option<String>,
        params: &T::Params,
        asset: T,
    ) -> Result<Arc<T>, AssetError> {
        let entry = ManifestEntry {
            kind: T::KIND,
            source: T::source_path(params),
            params: serde_json::to_value(params)
                .map_err(|e| AssetError::invalid(format!("{} {id}", T::KIND), e.to_string()))?,
        };

        let asset = Arc::new(asset);
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Store::<T>::new()))
            .downcast_mut::<Store<T>>()
            .ok_or_else(|| AssetError::invalid(T::KIND, "asset store type mismatch"))?
            .insert(id, Arc::clone(&asset));

        if let Some(key) = key {
            self.cache.entry((T::KIND, key)).or_insert(id);
        }
        self.entries.insert(id, entry);
        log::debug!("Created {} {}", T::KIND, id);
        Ok(asset)
    }

    fn store<T: Asset>(&self) -> Option<&Store<T>> {
        self.stores.get(&TypeId::of::<T>())?.downcast_ref::<Store<T>>()
    }

    fn cached<T: Asset>(&self, key: &str) -> Option<Arc<T>> {
        let id = self.cache.get(&(T::KIND, key.to_string()))?;
        self.get::<T>(*id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MaterialParams, MeshSource, ShaderParams, TextureParams};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        image::RgbaImage::new(width, height).save(path).unwrap();
    }

    fn write_shaders(dir: &Path) {
        std::fs::create_dir_all(dir.join("shaders")).unwrap();
        std::fs::write(dir.join("shaders/basic.vert"), "void main() {}").unwrap();
        std::fs::write(dir.join("shaders/basic.frag"), "void main() {}").unwrap();
    }

    #[test]
    fn test_textures_are_deduplicated_by_path() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "textures/grass.png", 4, 4);
        let mut resources = ResourceManager::with_root(dir.path());

        let a = resources.create_asset::<Texture2D>("textures/grass.png".into()).unwrap();
        let b = resources
            .create_asset::<Texture2D>("textures/../textures/grass.png".into())
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resources.len(), 1);
        assert_eq!(a.width(), 4);
    }

    #[test]
    fn test_materials_and_procedural_meshes_are_never_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        write_shaders(dir.path());
        let mut resources = ResourceManager::with_root(dir.path());

        let shader = resources
            .create_asset::<ShaderProgram>(ShaderParams::new("shaders/basic.vert", "shaders/basic.frag"))
            .unwrap();
        let m1 = resources.create_asset::<Material>(MaterialParams::new("a", &shader)).unwrap();
        let m2 = resources.create_asset::<Material>(MaterialParams::new("a", &shader)).unwrap();
        assert!(!Arc::ptr_eq(&m1, &m2));
        assert_ne!(m1.id(), m2.id());

        let p1 = resources.create_asset::<Mesh>(MeshSource::unit_plane()).unwrap();
        let p2 = resources.create_asset::<Mesh>(MeshSource::unit_plane()).unwrap();
        assert!(!Arc::ptr_eq(&p1, &p2));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut resources = ResourceManager::with_root(dir.path());
        let result = resources.create_asset::<Texture2D>(TextureParams::new("nope.png"));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert!(resources.is_empty());
    }

    #[test]
    fn test_manifest_reload_preserves_ids_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 2, 2);
        write_png(dir.path(), "b.png", 2, 2);
        write_shaders(dir.path());

        let manifest_path = dir.path().join("manifest.json");
        let (a_id, b_id, material_id) = {
            let mut resources = ResourceManager::with_root(dir.path());
            let a = resources.create_asset::<Texture2D>("a.png".into()).unwrap();
            let b = resources.create_asset::<Texture2D>("b.png".into()).unwrap();
            let shader = resources
                .create_asset::<ShaderProgram>(ShaderParams::new("shaders/basic.vert", "shaders/basic.frag"))
                .unwrap();
            let material = resources
                .create_asset::<Material>(MaterialParams::new("uses b", &shader).with_texture("u_Diffuse", &b))
                .unwrap();
            resources.save_manifest(&manifest_path).unwrap();
            (a.id(), b.id(), material.id())
        };

        std::fs::remove_file(dir.path().join("b.png")).unwrap();

        let mut resources = ResourceManager::with_root(dir.path());
        let report = resources.load_manifest(&manifest_path).unwrap();

        assert!(report.loaded.contains(&a_id));
        let failed: Vec<AssetId> = report.failed.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![b_id, material_id]);
        assert!(resources.get::<Texture2D>(a_id).is_some());
        assert!(resources.get::<Material>(material_id).is_none());

        // New ids never collide with manifest ids
        let plane = resources.create_asset::<Mesh>(MeshSource::unit_plane()).unwrap();
        assert!(plane.id() > material_id);
    }

    #[test]
    fn test_loading_manifest_twice_skips_present_assets() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 2, 2);
        let manifest_path = dir.path().join("manifest.json");

        let mut resources = ResourceManager::with_root(dir.path());
        let a = resources.create_asset::<Texture2D>("a.png".into()).unwrap();
        resources.save_manifest(&manifest_path).unwrap();

        let report = resources.load_manifest(&manifest_path).unwrap();
        assert_eq!(report.skipped, vec![a.id()]);
        assert!(report.loaded.is_empty());
    }

    #[test]
    fn test_manifest_id_held_by_another_asset_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 2, 2);
        write_png(dir.path(), "b.png", 8, 8);
        let manifest_path = dir.path().join("manifest.json");

        let b_id = {
            let mut other = ResourceManager::with_root(dir.path());
            let b = other.create_asset::<Texture2D>("b.png".into()).unwrap();
            other.save_manifest(&manifest_path).unwrap();
            b.id()
        };

        let mut resources = ResourceManager::with_root(dir.path());
        let a = resources.create_asset::<Texture2D>("a.png".into()).unwrap();
        assert_eq!(a.id(), b_id);

        let report = resources.load_manifest(&manifest_path).unwrap();
        assert!(report.skipped.is_empty());
        assert!(report.loaded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, b_id);
        assert!(report.failed[0].1.contains("conflicting id"), "{}", report.failed[0].1);

        // The loaded asset is left alone
        assert_eq!(resources.get::<Texture2D>(b_id).unwrap().width(), 2);
    }

    #[test]
    fn test_get_with_wrong_type_is_none() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 2, 2);
        let mut resources = ResourceManager::with_root(dir.path());
        let a = resources.create_asset::<Texture2D>("a.png".into()).unwrap();
        assert!(resources.get::<TextureCube>(a.id()).is_none());
        assert_eq!(resources.kind_of(a.id()), Some(AssetKind::Texture2D));
    }
}
