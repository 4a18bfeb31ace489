//! Binaries published as one image per platform, tagged by version.

use std::sync::Arc;

use plugin_meta::ImageRegistryConfig;
use plugin_transport::RegistryClient;
use tracing::debug;

use crate::Distribution;
use crate::error::{Error, Result};

pub struct OciDistribution {
    config: ImageRegistryConfig,
    registry: Arc<dyn RegistryClient>,
}

impl OciDistribution {
    pub fn new(config: ImageRegistryConfig, registry: Arc<dyn RegistryClient>) -> Self {
        Self { config, registry }
    }

    fn repository(&self) -> String {
        format!(
            "{}/{}",
            self.config.registry.trim_end_matches('/'),
            self.config.repository_path.trim_matches('/')
        )
    }

    /// `{registry}/{repositoryPath}/{os}-{arch}:{version}`
    pub fn image_reference(&self, version: &str, os: &str, arch: &str) -> String {
        format!("{}/{os}-{arch}:{version}", self.repository())
    }
}

impl Distribution for OciDistribution {
    fn fetch(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>> {
        let reference = self.image_reference(version, os, arch);
        debug!(%reference, "pulling plugin image");
        self.registry
            .pull(&reference)
            .map_err(|e| Error::fetch(format!("registry {}", self.config.registry), reference, e))
    }

    /// Registries carry no test binaries.
    fn fetch_test(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>> {
        Err(Error::NotFound {
            distribution: format!("registry {}", self.config.registry),
            artifact: format!("test binary for {}", self.image_reference(version, os, arch)),
        })
    }

    fn installation_path(&self) -> String {
        format!("oci/{}", self.repository().replace(':', "_"))
    }
}
