//! Manifest object in an object-storage bucket.

use std::sync::Arc;

use plugin_fs::constants::MANIFEST_FILE_NAME;
use plugin_transport::{ObjectLocation, ObjectStore};

use crate::config::ObjectStorageDiscoveryConfig;
use crate::error::{Error, Result};
use crate::manifest::{ManifestDiscovery, ManifestFetch};

pub type ObjectStorageDiscovery = ManifestDiscovery<ObjectStorageManifest>;

pub struct ObjectStorageManifest {
    location: ObjectLocation,
    store: Arc<dyn ObjectStore>,
}

impl ObjectStorageManifest {
    pub fn new(config: &ObjectStorageDiscoveryConfig, store: Arc<dyn ObjectStore>) -> Self {
        let key = match config.manifest_path.trim_matches('/') {
            "" => MANIFEST_FILE_NAME,
            key => key,
        };
        Self {
            location: ObjectLocation::new(config.endpoint.clone(), &config.bucket, key),
            store,
        }
    }
}

impl ManifestFetch for ObjectStorageManifest {
    const SOURCE_TYPE: &'static str = "gcp";

    fn fetch(&self, discovery: &str) -> Result<Vec<u8>> {
        self.store
            .get(&self.location)
            .map_err(|e| Error::transport(discovery, e))
    }
}
