//! Plugin metadata for the plugin manager.
//!
//! This crate holds the data model shared by discovery, distribution, the
//! catalog and the manager:
//!
//! - [`Platform`] and [`Scope`]
//! - [`DistributionConfig`] and its resolved form [`DistributionSource`]
//! - [`VersionConstraints`] and the version resolver ([`version::resolve`])
//! - [`Plugin`] (discovered) and [`PluginDescriptor`] (installed)
//! - [`Manifest`], the document a discovery source publishes
//! - descriptor validation ([`validation::validate_descriptor`])

pub mod descriptor;
pub mod distribution;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod plugin;
pub mod validation;
pub mod version;

pub use descriptor::PluginDescriptor;
pub use distribution::{
    DistributionConfig, DistributionSource, ImageRegistryConfig, ObjectStorageConfig,
};
pub use error::{Error, Result, ValidationErrors};
pub use manifest::{Manifest, ManifestPlugin};
pub use platform::{Platform, Scope};
pub use plugin::Plugin;
pub use validation::{BOOTSTRAP_PLUGIN, validate_descriptor};
pub use version::{DEV_VERSION, VersionConstraints, VersionRange};
