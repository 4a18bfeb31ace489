//! Distribution configuration: where a plugin's binaries are fetched from.
//!
//! [`DistributionConfig`] is the wire form found in manifests. Exactly one of
//! its fields must be set; [`DistributionConfig::resolve`] turns it into the
//! closed [`DistributionSource`] enum or reports which rule was broken.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Object-storage bucket with an optional object prefix.
///
/// Objects are addressed as `{bucket}/{basePath}/{version}/{os}/{arch}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStorageConfig {
    pub bucket: String,
    #[serde(default)]
    pub base_path: String,
    /// Storage endpoint; `https://storage.googleapis.com` when absent.
    /// A `file://` URL serves objects from a local directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// OCI image registry holding one image per platform and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRegistryConfig {
    /// DNS-compatible registry host, e.g. `harbor.example.com`.
    pub registry: String,
    /// Repository path without leading or trailing `/`, e.g. `cli/plugins/cluster`.
    pub repository_path: String,
}

/// Wire form of a distribution mechanism. Only one field may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_storage: Option<ObjectStorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<ImageRegistryConfig>,
}

/// A validated distribution mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionSource {
    ObjectStorage(ObjectStorageConfig),
    ImageRegistry(ImageRegistryConfig),
}

impl DistributionConfig {
    pub fn object_storage(config: ObjectStorageConfig) -> Self {
        Self {
            object_storage: Some(config),
            image_registry: None,
        }
    }

    pub fn image_registry(config: ImageRegistryConfig) -> Self {
        Self {
            object_storage: None,
            image_registry: Some(config),
        }
    }

    /// Resolve to exactly one [`DistributionSource`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if no variant or more than one
    /// variant is set, or if the selected variant has empty required fields.
    pub fn resolve(&self) -> Result<DistributionSource> {
        match (&self.object_storage, &self.image_registry) {
            (Some(os), None) => {
                if os.bucket.trim().is_empty() {
                    return Err(invalid("objectStorage.bucket must not be empty"));
                }
                Ok(DistributionSource::ObjectStorage(os.clone()))
            }
            (None, Some(oci)) => {
                if oci.registry.trim().is_empty() {
                    return Err(invalid("imageRegistry.registry must not be empty"));
                }
                if oci.repository_path.trim_matches('/').is_empty() {
                    return Err(invalid("imageRegistry.repositoryPath must not be empty"));
                }
                Ok(DistributionSource::ImageRegistry(oci.clone()))
            }
            (None, None) => Err(invalid(
                "no distribution set; expected exactly one of objectStorage or imageRegistry",
            )),
            (Some(_), Some(_)) => Err(invalid(
                "multiple distributions set; expected exactly one of objectStorage or imageRegistry",
            )),
        }
    }
}

fn invalid(reason: &str) -> Error {
    Error::InvalidDistribution {
        reason: reason.to_string(),
    }
}
