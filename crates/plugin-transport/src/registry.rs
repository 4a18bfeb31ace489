//! OCI image registry access.
//!
//! Plugin artifacts are single-layer images; pulling an image returns the
//! bytes of its first layer.

use std::collections::HashMap;
use std::sync::Mutex;

use oci_client::client::{ClientConfig, ClientProtocol};
use oci_client::manifest::OciManifest;
use oci_client::secrets::RegistryAuth;
use oci_client::{Client, Reference};
use tracing::debug;

use crate::error::{Error, Result};

/// Pulls image content from a registry.
pub trait RegistryClient: Send + Sync {
    /// Pull `reference` (`registry/repository:tag`) and return its first layer.
    fn pull(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Anonymous OCI client driven on a private current-thread runtime.
pub struct OciRegistryClient {
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl OciRegistryClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Client that talks plain HTTP to the listed registries (local test registries).
    pub fn with_insecure_registries(registries: Vec<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            protocol: ClientProtocol::HttpsExcept(registries),
            ..Default::default()
        })
    }

    fn with_config(config: ClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        Ok(Self {
            client: Client::new(config),
            runtime,
        })
    }

    async fn pull_first_layer(&self, reference: &Reference) -> std::result::Result<Vec<u8>, PullError> {
        let auth = RegistryAuth::Anonymous;

        let (manifest, digest) = self
            .client
            .pull_manifest(reference, &auth)
            .await
            .map_err(|e| PullError::Client(e.to_string()))?;
        debug!(%reference, %digest, "pulled manifest");

        let layers = match manifest {
            OciManifest::Image(m) => m.layers,
            _ => return Err(PullError::Unsupported("image index (expected a single image)")),
        };
        let layer = layers
            .first()
            .ok_or(PullError::Unsupported("image manifest has no layers"))?;

        let mut blob = Vec::new();
        self.client
            .pull_blob(reference, layer, &mut blob)
            .await
            .map_err(|e| PullError::Client(e.to_string()))?;
        Ok(blob)
    }
}

enum PullError {
    Client(String),
    Unsupported(&'static str),
}

impl RegistryClient for OciRegistryClient {
    fn pull(&self, reference: &str) -> Result<Vec<u8>> {
        let parsed = reference
            .parse::<Reference>()
            .map_err(|e| Error::InvalidReference {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        debug!(reference, "pulling image");
        match self.runtime.block_on(self.pull_first_layer(&parsed)) {
            Ok(bytes) => Ok(bytes),
            Err(PullError::Client(message)) if looks_missing(&message) => {
                Err(Error::not_found(reference))
            }
            Err(PullError::Client(message)) => Err(Error::Registry {
                reference: reference.to_string(),
                message,
            }),
            Err(PullError::Unsupported(message)) => Err(Error::Registry {
                reference: reference.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Registries report absent repositories and tags in several ways.
fn looks_missing(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["not found", "manifest_unknown", "name_unknown", "404"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// In-memory registry keyed by full reference.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: &str, bytes: impl Into<Vec<u8>>) {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(reference.to_string(), bytes.into());
    }
}

impl RegistryClient for MemoryRegistry {
    fn pull(&self, reference: &str) -> Result<Vec<u8>> {
        self.images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::not_found(reference))
    }
}
