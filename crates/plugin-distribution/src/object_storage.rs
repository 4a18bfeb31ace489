//! Binaries stored as `{basePath}/{version}/{os}/{arch}` objects.

use std::sync::Arc;

use plugin_meta::ObjectStorageConfig;
use plugin_transport::{ObjectLocation, ObjectStore};
use tracing::debug;

use crate::Distribution;
use crate::error::{Error, Result};

const TEST_SEGMENT: &str = "test";

pub struct ObjectStorageDistribution {
    config: ObjectStorageConfig,
    store: Arc<dyn ObjectStore>,
}

impl ObjectStorageDistribution {
    pub fn new(config: ObjectStorageConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    fn key(&self, segments: &[&str]) -> String {
        std::iter::once(self.config.base_path.trim_matches('/'))
            .chain(segments.iter().copied())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn get(&self, key: String) -> Result<Vec<u8>> {
        let location = ObjectLocation::new(self.config.endpoint.clone(), &self.config.bucket, key);
        debug!(%location, "fetching plugin artifact");
        self.store.get(&location).map_err(|e| {
            Error::fetch(
                format!("bucket {}", self.config.bucket),
                location.key.clone(),
                e,
            )
        })
    }
}

impl Distribution for ObjectStorageDistribution {
    fn fetch(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>> {
        self.get(self.key(&[version, os, arch]))
    }

    fn fetch_test(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>> {
        self.get(self.key(&[version, TEST_SEGMENT, os, arch]))
    }

    fn installation_path(&self) -> String {
        let base = self.config.base_path.trim_matches('/');
        if base.is_empty() {
            format!("objects/{}", self.config.bucket)
        } else {
            format!("objects/{}/{}", self.config.bucket, base)
        }
    }
}
