//! [`TestHome`]: a temporary plugin root with local sources.

use std::fs;
use std::path::{Path, PathBuf};

use plugin_meta::{Manifest, ManifestPlugin};
use tempfile::TempDir;

/// A temporary directory laid out like a client installation.
///
/// ```text
/// <root>/plugins/             plugin root
/// <root>/cache/catalog.yaml   catalog
/// <root>/buckets/<bucket>/    objects served through a file:// endpoint
/// <root>/sources/             manifests for local discoveries
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn plugin_root(&self) -> PathBuf {
        self.root().join("plugins")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root().join("cache").join("catalog.yaml")
    }

    pub fn bucket_root(&self) -> PathBuf {
        self.root().join("buckets")
    }

    /// `file://` endpoint serving [`bucket_root`](Self::bucket_root).
    pub fn endpoint(&self) -> String {
        format!("file://{}", self.bucket_root().display())
    }

    /// Store an object under `<bucket_root>/<bucket>/<key>`.
    pub fn put_object(&self, bucket: &str, key: &str, bytes: impl AsRef<[u8]>) -> PathBuf {
        let path = self.bucket_root().join(bucket).join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Write a manifest listing `plugins` to `sources/<name>.yaml`.
    pub fn write_manifest(&self, name: &str, plugins: Vec<ManifestPlugin>) -> PathBuf {
        let manifest = Manifest {
            created: None,
            plugins,
        };
        let path = self.root().join("sources").join(format!("{name}.yaml"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, manifest.to_yaml().unwrap()).unwrap();
        path
    }

    /// Write raw text to a path relative to the root.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn assert_exists(&self, path: &Path) {
        assert!(path.exists(), "expected {} to exist", path.display());
    }

    pub fn assert_missing(&self, path: &Path) {
        assert!(!path.exists(), "expected {} to be absent", path.display());
    }
}
