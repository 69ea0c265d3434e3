//! The [`AssetStore`] is where all "cold" asset data lives.
//!
//! It bundles the per-type stores and keeps a path index on top of them:
//! loading the same file twice hands back the handle that already exists,
//! and a failed load caches nothing. GPU-side instantiation is the
//! renderer's asset cache's job, not this one's.

use crate::mesh::{Mesh, MeshError};
use crate::shader::{Shader, ShaderError};
use crate::store::Store;
use crate::{HMesh, HShader};
use dashmap::DashMap;
use snafu::{ResultExt, Snafu};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum AssetError {
    #[snafu(display("Failed to read asset file {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to load mesh {}: {source}", path.display()))]
    MeshLoad { path: PathBuf, source: MeshError },

    #[snafu(display("Failed to load shader {}: {source}", path.display()))]
    ShaderLoad { path: PathBuf, source: ShaderError },

    #[snafu(display("Asset {} is already loaded as a different kind", path.display()))]
    KindMismatch { path: PathBuf },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum PathBinding {
    Mesh(HMesh),
    Shader(HShader),
}

pub struct AssetStore {
    pub meshes: Arc<Store<Mesh>>,
    pub shaders: Arc<Store<Shader>>,
    paths: DashMap<PathBuf, PathBinding>,
}

impl AssetStore {
    pub fn new() -> Arc<AssetStore> {
        Arc::new(AssetStore {
            meshes: Arc::new(Store::populated()),
            shaders: Arc::new(Store::populated()),
            paths: DashMap::new(),
        })
    }

    /// Loads a mesh from disk, or returns the handle a previous load of the
    /// same path produced.
    pub fn load_mesh(&self, path: impl AsRef<Path>) -> Result<HMesh, AssetError> {
        let path = path.as_ref();

        if let Some(binding) = self.paths.get(path) {
            return match *binding {
                PathBinding::Mesh(handle) => Ok(handle),
                PathBinding::Shader(_) => KindMismatchErr { path }.fail(),
            };
        }

        let bytes = fs::read(path).context(IoErr { path })?;
        let mesh = Mesh::load_from_obj_slice(&bytes).context(MeshLoadErr { path })?;

        let handle = self.meshes.add(mesh);
        self.paths
            .insert(path.to_path_buf(), PathBinding::Mesh(handle));
        debug!("Loaded mesh {:?} as {handle:?}", path.display());

        Ok(handle)
    }

    /// Loads and validates a WGSL shader from disk, deduplicated by path
    /// like [`AssetStore::load_mesh`].
    pub fn load_shader(&self, path: impl AsRef<Path>) -> Result<HShader, AssetError> {
        let path = path.as_ref();

        if let Some(binding) = self.paths.get(path) {
            return match *binding {
                PathBinding::Shader(handle) => Ok(handle),
                PathBinding::Mesh(_) => KindMismatchErr { path }.fail(),
            };
        }

        let code = fs::read_to_string(path).context(IoErr { path })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let shader = Shader::from_source(name, code).context(ShaderLoadErr { path })?;

        let handle = self.shaders.add(shader);
        self.paths
            .insert(path.to_path_buf(), PathBinding::Shader(handle));
        debug!("Loaded shader {:?} as {handle:?}", path.display());

        Ok(handle)
    }

    pub fn lookup_mesh(&self, path: impl AsRef<Path>) -> Option<HMesh> {
        match self.paths.get(path.as_ref()).map(|b| *b) {
            Some(PathBinding::Mesh(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn lookup_shader(&self, path: impl AsRef<Path>) -> Option<HShader> {
        match self.paths.get(path.as_ref()).map(|b| *b) {
            Some(PathBinding::Shader(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        self.paths.contains_key(path.as_ref())
    }

    /// The path a mesh handle was loaded from, if it came from disk.
    pub fn mesh_path(&self, handle: HMesh) -> Option<PathBuf> {
        self.paths.iter().find_map(|entry| match entry.value() {
            PathBinding::Mesh(h) if *h == handle => Some(entry.key().clone()),
            _ => None,
        })
    }

    pub fn shader_path(&self, handle: HShader) -> Option<PathBuf> {
        self.paths.iter().find_map(|entry| match entry.value() {
            PathBinding::Shader(h) if *h == handle => Some(entry.key().clone()),
            _ => None,
        })
    }

    /// Drops the path binding and the asset it pointed at. Returns `false`
    /// if the path was never loaded.
    pub fn forget(&self, path: impl AsRef<Path>) -> bool {
        let Some((_, binding)) = self.paths.remove(path.as_ref()) else {
            return false;
        };

        match binding {
            PathBinding::Mesh(handle) => {
                self.meshes.remove(handle);
            }
            PathBinding::Shader(handle) => {
                self.shaders.remove(handle);
            }
        }

        true
    }

    /// Unloads every path-bound asset. Built-in defaults stay.
    pub fn forget_all(&self) {
        let paths: Vec<PathBuf> = self.paths.iter().map(|entry| entry.key().clone()).collect();
        for path in paths {
            self.forget(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HMesh, HShader};

    #[test]
    fn defaults_are_always_present() {
        let store = AssetStore::new();

        assert!(store.meshes.try_get(HMesh::UNIT_CUBE).is_some());
        assert!(store.shaders.try_get(HShader::DEFAULT).is_some());
    }

    #[test]
    fn missing_files_cache_nothing() {
        let store = AssetStore::new();
        let path = "does/not/exist.obj";

        assert!(matches!(
            store.load_mesh(path),
            Err(AssetError::Io { .. })
        ));
        assert!(!store.is_loaded(path));
    }

    #[test]
    fn loading_the_same_path_twice_returns_the_same_handle() {
        let dir = std::env::temp_dir().join(format!("kestrel_asset_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.obj");
        fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n",
        )
        .unwrap();

        let store = AssetStore::new();
        let first = store.load_mesh(&path).unwrap();
        let second = store.load_mesh(&path).unwrap();
        assert_eq!(first, second);
        assert!(store.is_loaded(&path));
        assert_eq!(store.mesh_path(first), Some(path.clone()));

        assert!(store.forget(&path));
        assert!(!store.is_loaded(&path));
        assert!(store.meshes.try_get(first).is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn forget_all_keeps_defaults() {
        let store = AssetStore::new();
        store.forget_all();

        assert!(store.meshes.try_get(HMesh::UNIT_CUBE).is_some());
        assert!(store.shaders.try_get(HShader::DEFAULT).is_some());
    }
}
