//! Plugin discovery.
//!
//! A [`Discovery`] reports which plugins a source advertises. Every backend
//! publishes the same manifest document and differs only in how the bytes
//! are fetched:
//!
//! - [`LocalDiscovery`] reads a file
//! - [`ObjectStorageDiscovery`] reads an object from a bucket
//! - [`OciDiscovery`] pulls an OCI artifact
//!
//! Backends are selected once, by [`create_discovery`], from the resolved
//! [`DiscoveryConfig`].

pub mod config;
pub mod error;
pub mod local;
pub mod manifest;
pub mod object_storage;
pub mod oci;

use plugin_meta::{Plugin, Scope};
use plugin_transport::Transports;

pub use config::{
    DiscoveryConfig, DiscoverySource, LocalDiscoveryConfig, ObjectStorageDiscoveryConfig,
    OciDiscoveryConfig,
};
pub use error::{Error, Result};
pub use local::{LocalDiscovery, LocalManifest};
pub use manifest::{ManifestDiscovery, ManifestFetch};
pub use object_storage::{ObjectStorageDiscovery, ObjectStorageManifest};
pub use oci::{OciDiscovery, OciManifest};

/// A source of plugin metadata.
pub trait Discovery: Send + Sync {
    fn name(&self) -> &str;

    fn source_type(&self) -> &'static str;

    /// Every plugin the source currently advertises. Side-effect free.
    fn list(&self) -> Result<Vec<Plugin>>;

    /// The listed plugin called `name`, or [`Error::NotFound`].
    fn describe(&self, name: &str) -> Result<Plugin>;
}

/// Build the discovery selected by `config`.
pub fn create_discovery(
    config: &DiscoveryConfig,
    scope: Scope,
    transports: &Transports,
) -> Result<Box<dyn Discovery>> {
    let discovery: Box<dyn Discovery> = match config.resolve()? {
        DiscoverySource::Local(local) => Box::new(LocalDiscovery::new(
            &config.name,
            scope,
            LocalManifest::new(local.path),
        )),
        DiscoverySource::ObjectStorage(os) => Box::new(ObjectStorageDiscovery::new(
            &config.name,
            scope,
            ObjectStorageManifest::new(&os, transports.object_store.clone()),
        )),
        DiscoverySource::Oci(oci) => Box::new(OciDiscovery::new(
            &config.name,
            scope,
            OciManifest::new(&oci, transports.registry.clone()),
        )),
    };
    Ok(discovery)
}
