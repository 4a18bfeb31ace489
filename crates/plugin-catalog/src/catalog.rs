//! The catalog document.

use plugin_meta::{PluginDescriptor, Scope};
use serde::{Deserialize, Serialize};

pub const CATALOG_VERSION: &str = "1.0";

/// Installed plugins, one entry per (scope, name), in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Format version for forward compatibility
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    plugins: Vec<PluginDescriptor>,
}

fn default_version() -> String {
    CATALOG_VERSION.to_string()
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            plugins: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Entries installed in `scope`.
    pub fn entries(&self, scope: Scope) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter().filter(move |p| p.scope == scope)
    }

    pub fn get(&self, scope: Scope, name: &str) -> Option<&PluginDescriptor> {
        self.plugins
            .iter()
            .find(|p| p.scope == scope && p.name == name)
    }

    /// Lookup by name alone; a context entry shadows a standalone one.
    pub fn find(&self, name: &str) -> Option<&PluginDescriptor> {
        self.get(Scope::Context, name)
            .or_else(|| self.get(Scope::Standalone, name))
    }

    /// Replace the entry with the same (scope, name) in place, or append.
    ///
    /// Returns the entry that was replaced.
    pub fn upsert(&mut self, scope: Scope, mut descriptor: PluginDescriptor) -> Option<PluginDescriptor> {
        descriptor.scope = scope;
        match self
            .plugins
            .iter_mut()
            .find(|p| p.scope == scope && p.name == descriptor.name)
        {
            Some(existing) => Some(std::mem::replace(existing, descriptor)),
            None => {
                self.plugins.push(descriptor);
                None
            }
        }
    }

    /// Remove the entry for (scope, name), if any.
    pub fn remove(&mut self, scope: Scope, name: &str) -> Option<PluginDescriptor> {
        let pos = self
            .plugins
            .iter()
            .position(|p| p.scope == scope && p.name == name)?;
        Some(self.plugins.remove(pos))
    }

    /// Whether any entry points at `installation_path`.
    ///
    /// Binary paths carry no scope, so the same file can back a standalone
    /// and a context entry.
    pub fn references(&self, installation_path: &str) -> bool {
        self.plugins
            .iter()
            .any(|p| p.installation_path == installation_path)
    }
}
