//! Manifest file on the local filesystem.

use std::path::{Path, PathBuf};

use plugin_fs::constants::MANIFEST_FILE_NAME;

use crate::error::{Error, Result};
use crate::manifest::{ManifestDiscovery, ManifestFetch};

pub type LocalDiscovery = ManifestDiscovery<LocalManifest>;

#[derive(Debug, Clone)]
pub struct LocalManifest {
    path: PathBuf,
}

impl LocalManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The manifest file, resolving a directory to its `manifest.yaml`.
    pub fn manifest_path(&self) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(MANIFEST_FILE_NAME)
        } else {
            self.path.clone()
        }
    }
}

impl ManifestFetch for LocalManifest {
    const SOURCE_TYPE: &'static str = "local";

    fn fetch(&self, discovery: &str) -> Result<Vec<u8>> {
        let path = self.manifest_path();
        let fs_err = |source| Error::Fs {
            discovery: discovery.to_string(),
            path: path.clone(),
            source,
        };
        plugin_fs::io::read_optional(&path)
            .map_err(fs_err)?
            .ok_or_else(|| Error::ManifestNotFound {
                discovery: discovery.to_string(),
                location: display(&path),
            })
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
