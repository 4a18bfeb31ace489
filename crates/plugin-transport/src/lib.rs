//! Network boundary for plugin discovery and distribution.
//!
//! Two traits cover every remote backend:
//!
//! - [`ObjectStore`] reads objects by endpoint, bucket and key
//! - [`RegistryClient`] pulls single-layer OCI images
//!
//! [`Transports`] bundles one of each so callers can swap in the in-memory
//! implementations.

pub mod error;
pub mod object_store;
pub mod registry;

use std::sync::Arc;

pub use error::{Error, Result};
pub use object_store::{
    DefaultObjectStore, FsObjectStore, HttpObjectStore, MemoryObjectStore, ObjectLocation,
    ObjectStore,
};
pub use registry::{MemoryRegistry, OciRegistryClient, RegistryClient};

/// The clients discovery and distribution backends fetch through.
#[derive(Clone)]
pub struct Transports {
    pub object_store: Arc<dyn ObjectStore>,
    pub registry: Arc<dyn RegistryClient>,
}

impl Transports {
    pub fn new(object_store: Arc<dyn ObjectStore>, registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            object_store,
            registry,
        }
    }

    /// HTTP/filesystem object storage and an anonymous OCI client.
    ///
    /// `insecure_registries` are reached over plain HTTP.
    pub fn default_clients(insecure_registries: &[String]) -> Result<Self> {
        let registry = if insecure_registries.is_empty() {
            OciRegistryClient::new()?
        } else {
            OciRegistryClient::with_insecure_registries(insecure_registries.to_vec())?
        };
        Ok(Self::new(Arc::new(DefaultObjectStore::new()?), Arc::new(registry)))
    }
}

impl std::fmt::Debug for Transports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transports").finish_non_exhaustive()
    }
}
