//! Discovery configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tag pulled when an OCI discovery does not name one.
pub const DEFAULT_OCI_TAG: &str = "latest";

/// A manifest file on disk. A directory means `<dir>/manifest.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDiscoveryConfig {
    pub path: PathBuf,
}

/// A manifest object in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStorageDiscoveryConfig {
    pub bucket: String,
    /// Object key of the manifest; `manifest.yaml` when empty.
    #[serde(default)]
    pub manifest_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// A manifest published as a single-layer OCI artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciDiscoveryConfig {
    pub registry: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl OciDiscoveryConfig {
    /// `{registry}/{repository}:{tag}`
    pub fn image_reference(&self) -> String {
        format!(
            "{}/{}:{}",
            self.registry.trim_end_matches('/'),
            self.repository.trim_matches('/'),
            self.tag.as_deref().unwrap_or(DEFAULT_OCI_TAG)
        )
    }
}

/// Wire form of a discovery source. Exactly one backend must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalDiscoveryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_storage: Option<ObjectStorageDiscoveryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci: Option<OciDiscoveryConfig>,
}

/// A validated discovery backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverySource {
    Local(LocalDiscoveryConfig),
    ObjectStorage(ObjectStorageDiscoveryConfig),
    Oci(OciDiscoveryConfig),
}

impl DiscoveryConfig {
    pub fn local(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local: Some(LocalDiscoveryConfig { path: path.into() }),
            ..Default::default()
        }
    }

    pub fn object_storage(name: impl Into<String>, config: ObjectStorageDiscoveryConfig) -> Self {
        Self {
            name: name.into(),
            object_storage: Some(config),
            ..Default::default()
        }
    }

    pub fn oci(name: impl Into<String>, config: OciDiscoveryConfig) -> Self {
        Self {
            name: name.into(),
            oci: Some(config),
            ..Default::default()
        }
    }

    /// Resolve to exactly one [`DiscoverySource`].
    pub fn resolve(&self) -> Result<DiscoverySource> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }

        let mut sources = Vec::with_capacity(1);
        if let Some(local) = &self.local {
            sources.push(DiscoverySource::Local(local.clone()));
        }
        if let Some(os) = &self.object_storage {
            if os.bucket.trim().is_empty() {
                return Err(self.invalid("objectStorage.bucket must not be empty"));
            }
            sources.push(DiscoverySource::ObjectStorage(os.clone()));
        }
        if let Some(oci) = &self.oci {
            if oci.registry.trim().is_empty() || oci.repository.trim_matches('/').is_empty() {
                return Err(self.invalid("oci.registry and oci.repository must not be empty"));
            }
            sources.push(DiscoverySource::Oci(oci.clone()));
        }

        match sources.len() {
            0 => Err(self.invalid(
                "no discovery set; expected exactly one of local, objectStorage or oci",
            )),
            1 => Ok(sources.remove(0)),
            _ => Err(self.invalid(
                "multiple discoveries set; expected exactly one of local, objectStorage or oci",
            )),
        }
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidConfig {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}
