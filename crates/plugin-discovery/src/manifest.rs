//! Manifest-backed discovery shared by every backend.

use plugin_meta::{Manifest, Plugin, Scope};
use tracing::debug;

use crate::error::{Error, Result};
use crate::Discovery;

/// Fetches raw manifest bytes from one backend.
pub trait ManifestFetch: Send + Sync {
    /// Short backend name used in `discoverySourceName`.
    const SOURCE_TYPE: &'static str;

    fn fetch(&self, discovery: &str) -> Result<Vec<u8>>;
}

/// A discovery that reads a [`Manifest`] through `F`.
#[derive(Debug, Clone)]
pub struct ManifestDiscovery<F> {
    name: String,
    scope: Scope,
    fetcher: F,
}

impl<F: ManifestFetch> ManifestDiscovery<F> {
    pub fn new(name: impl Into<String>, scope: Scope, fetcher: F) -> Self {
        Self {
            name: name.into(),
            scope,
            fetcher,
        }
    }

    /// `"{type}/{name}"`
    pub fn source_name(&self) -> String {
        format!("{}/{}", F::SOURCE_TYPE, self.name)
    }
}

impl<F: ManifestFetch> Discovery for ManifestDiscovery<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> &'static str {
        F::SOURCE_TYPE
    }

    fn list(&self) -> Result<Vec<Plugin>> {
        let bytes = self.fetcher.fetch(&self.name)?;
        let manifest_err = |source| Error::Manifest {
            discovery: self.source_name(),
            source,
        };

        let manifest = Manifest::parse(&bytes).map_err(manifest_err)?;
        manifest.validate().map_err(manifest_err)?;

        let plugins = manifest.into_plugins(&self.source_name(), self.scope);
        debug!(discovery = %self.source_name(), count = plugins.len(), "listed plugins");
        Ok(plugins)
    }

    fn describe(&self, name: &str) -> Result<Plugin> {
        self.list()?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::NotFound {
                discovery: self.source_name(),
                plugin: name.to_string(),
            })
    }
}
