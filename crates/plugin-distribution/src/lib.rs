//! Plugin artifact distribution.
//!
//! A [`Distribution`] fetches the binary for one (version, os, arch) and
//! names the directory its installs live under. The backend is picked once,
//! by [`create_distribution`], from the plugin's [`DistributionConfig`].

pub mod error;
pub mod object_storage;
pub mod oci;

use plugin_meta::{DistributionConfig, DistributionSource};
use plugin_transport::Transports;

pub use error::{Error, Result};
pub use object_storage::ObjectStorageDistribution;
pub use oci::OciDistribution;

pub trait Distribution: Send + Sync {
    /// Raw artifact bytes, or [`Error::NotFound`] if the backend has none.
    fn fetch(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>>;

    /// Same as [`fetch`](Self::fetch) for the parallel test-binary namespace.
    fn fetch_test(&self, version: &str, os: &str, arch: &str) -> Result<Vec<u8>>;

    /// Relative directory that namespaces this backend's installs.
    fn installation_path(&self) -> String;
}

pub fn create_distribution(
    config: &DistributionConfig,
    transports: &Transports,
) -> Result<Box<dyn Distribution>> {
    let distribution: Box<dyn Distribution> = match config.resolve()? {
        DistributionSource::ObjectStorage(os) => Box::new(ObjectStorageDistribution::new(
            os,
            transports.object_store.clone(),
        )),
        DistributionSource::ImageRegistry(oci) => {
            Box::new(OciDistribution::new(oci, transports.registry.clone()))
        }
    };
    Ok(distribution)
}
