//! Manifest published as an OCI artifact.

use std::sync::Arc;

use plugin_transport::RegistryClient;

use crate::config::OciDiscoveryConfig;
use crate::error::{Error, Result};
use crate::manifest::{ManifestDiscovery, ManifestFetch};

pub type OciDiscovery = ManifestDiscovery<OciManifest>;

pub struct OciManifest {
    reference: String,
    registry: Arc<dyn RegistryClient>,
}

impl OciManifest {
    pub fn new(config: &OciDiscoveryConfig, registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            reference: config.image_reference(),
            registry,
        }
    }
}

impl ManifestFetch for OciManifest {
    const SOURCE_TYPE: &'static str = "oci";

    fn fetch(&self, discovery: &str) -> Result<Vec<u8>> {
        self.registry
            .pull(&self.reference)
            .map_err(|e| Error::transport(discovery, e))
    }
}
