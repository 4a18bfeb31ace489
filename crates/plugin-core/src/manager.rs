//! Plugin manager: discovery, version resolution, install and removal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plugin_catalog::CatalogStore;
use plugin_discovery::{DiscoveryConfig, create_discovery};
use plugin_distribution::{Distribution, create_distribution};
use plugin_fs::PluginLayout;
use plugin_fs::checksum::file_matches;
use plugin_meta::version::{is_newer, resolve};
use plugin_meta::{Plugin, PluginDescriptor, Scope, ValidationErrors, validate_descriptor};
use plugin_transport::Transports;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::runner::{PluginRunner, PostInstall, ProcessRunner};

/// Installation state of a discovered plugin, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
    /// The source recommends a newer version than the one installed.
    UpdateAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginStatus {
    pub plugin: Plugin,
    pub installed: Option<PluginDescriptor>,
    pub state: InstallState,
}

/// Result of [`PluginManager::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub installed: Vec<PluginDescriptor>,
    /// Optional plugins left alone.
    pub skipped: Vec<String>,
    pub up_to_date: Vec<String>,
}

pub struct PluginManager {
    config: ManagerConfig,
    layout: PluginLayout,
    catalog: CatalogStore,
    transports: Transports,
    runner: Arc<dyn PluginRunner>,
}

impl PluginManager {
    pub fn new(config: ManagerConfig, transports: Transports, runner: Arc<dyn PluginRunner>) -> Self {
        let layout = PluginLayout::new(&config.plugin_root);
        let catalog = CatalogStore::new(&config.catalog_path, &config.plugin_root, config.lock_timeout);
        Self {
            config,
            layout,
            catalog,
            transports,
            runner,
        }
    }

    /// Manager with network transports and real subprocess execution.
    pub fn with_defaults(config: ManagerConfig) -> Result<Self> {
        let transports = Transports::default_clients(&config.insecure_registries)?;
        Ok(Self::new(config, transports, Arc::new(ProcessRunner)))
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Discovery configs consulted for `scope`, highest priority first.
    fn sources(&self, scope: Scope) -> Vec<(&DiscoveryConfig, Scope)> {
        let standalone = self.config.discoveries.iter().map(|d| (d, Scope::Standalone));
        match (scope, &self.config.context) {
            (Scope::Context, Some(context)) => context
                .discoveries
                .iter()
                .map(|d| (d, Scope::Context))
                .chain(standalone)
                .collect(),
            _ => standalone.collect(),
        }
    }

    /// Plugins advertised for `scope`.
    ///
    /// `Standalone` lists the standalone sources only. `Context` lists the
    /// current context's sources followed by the standalone ones; when two
    /// sources report the same name the first occurrence wins, so context
    /// entries shadow standalone ones.
    pub fn discover_plugins(&self, scope: Scope) -> Result<Vec<Plugin>> {
        let mut seen = HashSet::new();
        let mut plugins = Vec::new();

        for (config, source_scope) in self.sources(scope) {
            let discovery_err = |source| Error::Discovery {
                name: config.name.clone(),
                source,
            };
            let discovery =
                create_discovery(config, source_scope, &self.transports).map_err(discovery_err)?;
            for plugin in discovery.list().map_err(discovery_err)? {
                if seen.insert(plugin.name.clone()) {
                    plugins.push(plugin);
                } else {
                    debug!(plugin = %plugin.name, source = %plugin.discovery_source_name, "shadowed by higher-priority source");
                }
            }
        }

        Ok(plugins)
    }

    fn find_plugin(&self, name: &str) -> Result<Plugin> {
        self.discover_plugins(Scope::Context)?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::PluginNotFound {
                name: name.to_string(),
            })
    }

    /// Catalog entries for `scope`.
    pub fn list_installed(&self, scope: Scope) -> Result<Vec<PluginDescriptor>> {
        Ok(self.catalog.entries(scope)?)
    }

    /// Install `name` at `version` (empty for the recommended version).
    pub fn install(&self, name: &str, version: &str) -> Result<PluginDescriptor> {
        let plugin = self.find_plugin(name)?;
        self.install_plugin(&plugin, version)
    }

    /// Like [`install`](Self::install), for a plugin that is already installed.
    ///
    /// The new version replaces the installed entry even when the plugin is
    /// now advertised for the other scope, so only one entry remains.
    pub fn upgrade(&self, name: &str, version: &str) -> Result<PluginDescriptor> {
        if self.catalog.find(name)?.is_none() {
            return Err(Error::NotInstalled {
                name: name.to_string(),
            });
        }
        let plugin = self.find_plugin(name)?;
        self.install_into_catalog(&plugin, version, Replace::BothScopes)
    }

    fn install_plugin(&self, plugin: &Plugin, requested: &str) -> Result<PluginDescriptor> {
        self.install_into_catalog(plugin, requested, Replace::SameScope)
    }

    fn install_into_catalog(
        &self,
        plugin: &Plugin,
        requested: &str,
        replace: Replace,
    ) -> Result<PluginDescriptor> {
        let name = plugin.name.as_str();
        let version = resolve(&plugin.version_constraints, requested)?;
        debug!(plugin = name, requested, %version, "resolved version");

        let platform = &self.config.platform;
        if !plugin.supports(platform) {
            return Err(Error::UnsupportedPlatform {
                name: name.to_string(),
                platform: platform.to_string(),
            });
        }

        let distribution = self.distribution(plugin, &version)?;
        let bytes = distribution
            .fetch(&version, &platform.os, &platform.arch)
            .map_err(|source| self.fetch_error(name, &version, source))?;

        let binary = self.layout.binary_path(
            &distribution.installation_path(),
            name,
            &version,
            platform.is_windows(),
        )?;

        let fresh = !file_matches(&binary, &bytes);
        if fresh {
            plugin_fs::io::write_executable(&binary, &bytes)?;
            debug!(plugin = name, path = %binary.display(), size = bytes.len(), "wrote plugin binary");
        } else {
            debug!(plugin = name, path = %binary.display(), "identical binary already present");
        }

        let mut descriptor = match self.describe_and_validate(plugin, &binary) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                if fresh {
                    self.remove_binary(&binary);
                }
                return Err(e);
            }
        };

        descriptor.installation_path = binary.display().to_string();
        descriptor.discovery = plugin.discovery_source_name.clone();
        descriptor.scope = plugin.scope;

        let stale = match self.record(plugin.scope, descriptor.clone(), replace) {
            Ok(stale) => stale,
            Err(e) => {
                if fresh {
                    self.remove_binary(&binary);
                }
                return Err(e);
            }
        };
        for previous in stale {
            self.remove_binary(Path::new(&previous.installation_path));
        }

        match self.runner.post_install(&binary) {
            PostInstall::Completed => debug!(plugin = name, "post-install completed"),
            PostInstall::Unsupported => debug!(plugin = name, "plugin has no post-install step"),
            PostInstall::Failed(output) => {
                warn!(plugin = name, %output, "post-install failed; the plugin is installed")
            }
        }

        info!(plugin = name, version = %descriptor.version, scope = %plugin.scope, "installed plugin");
        Ok(descriptor)
    }

    /// Upsert `descriptor` and return the displaced entries whose binaries
    /// no entry references any more.
    fn record(
        &self,
        scope: Scope,
        descriptor: PluginDescriptor,
        replace: Replace,
    ) -> Result<Vec<PluginDescriptor>> {
        let name = descriptor.name.clone();
        Ok(self.catalog.update(|catalog| {
            let mut displaced: Vec<_> = catalog.upsert(scope, descriptor).into_iter().collect();
            if replace == Replace::BothScopes {
                displaced.extend(catalog.remove(other_scope(scope), &name));
            }
            let stale: Vec<_> = displaced
                .into_iter()
                .filter(|d| !catalog.references(&d.installation_path))
                .collect();
            (stale, true)
        })?)
    }

    fn distribution(&self, plugin: &Plugin, version: &str) -> Result<Box<dyn Distribution>> {
        create_distribution(&plugin.distribution, &self.transports)
            .map_err(|source| self.fetch_error(&plugin.name, version, source))
    }

    fn fetch_error(&self, name: &str, version: &str, source: plugin_distribution::Error) -> Error {
        Error::Distribution {
            name: name.to_string(),
            version: version.to_string(),
            source,
        }
    }

    fn describe_and_validate(&self, plugin: &Plugin, binary: &Path) -> Result<PluginDescriptor> {
        let descriptor = self.runner.describe(binary)?;
        self.validate(&descriptor)?;

        if descriptor.name != plugin.name {
            let mut report = ValidationErrors::new(format!("plugin {:?}", plugin.name));
            report.push(format!("binary reports name {:?}", descriptor.name));
            report.into_result()?;
        }
        Ok(descriptor)
    }

    /// Download the self-test binary for `name` next to its install.
    pub fn install_test(&self, name: &str, version: &str) -> Result<PathBuf> {
        let plugin = self.find_plugin(name)?;
        let version = resolve(&plugin.version_constraints, version)?;
        let platform = &self.config.platform;

        let distribution = self.distribution(&plugin, &version)?;
        let bytes = distribution
            .fetch_test(&version, &platform.os, &platform.arch)
            .map_err(|source| self.fetch_error(name, &version, source))?;

        let path = self.layout.test_binary_path(
            &distribution.installation_path(),
            name,
            &version,
            platform.is_windows(),
        )?;
        plugin_fs::io::write_executable(&path, &bytes)?;
        info!(plugin = name, %version, path = %path.display(), "installed test binary");
        Ok(path)
    }

    /// Remove an installed plugin: catalog entry first, then its binary.
    ///
    /// A context entry goes before a standalone one. The binary stays when
    /// the other scope's entry still points at it.
    pub fn delete(&self, name: &str) -> Result<PluginDescriptor> {
        let (removed, shared) = self.catalog.update(|catalog| {
            let removed = catalog
                .find(name)
                .map(|entry| entry.scope)
                .and_then(|scope| catalog.remove(scope, name));
            let shared = removed
                .as_ref()
                .is_some_and(|d| catalog.references(&d.installation_path));
            let changed = removed.is_some();
            ((removed, shared), changed)
        })?;
        let removed = removed.ok_or_else(|| Error::NotInstalled {
            name: name.to_string(),
        })?;

        if shared {
            debug!(plugin = name, path = %removed.installation_path, "binary still installed for the other scope");
        } else {
            self.remove_binary(Path::new(&removed.installation_path));
        }

        info!(plugin = name, version = %removed.version, "deleted plugin");
        Ok(removed)
    }

    /// Remove the catalog and every installed binary.
    pub fn clean(&self) -> Result<()> {
        self.catalog.clear()?;
        info!(root = %self.config.plugin_root.display(), "removed all plugins");
        Ok(())
    }

    /// Check a descriptor, reporting every violated rule.
    pub fn validate(&self, descriptor: &PluginDescriptor) -> Result<()> {
        Ok(validate_descriptor(descriptor)?)
    }

    /// Run the installed binary's `info` command.
    pub fn describe_installed(&self, name: &str) -> Result<PluginDescriptor> {
        let entry = self.catalog.find(name)?.ok_or_else(|| Error::NotInstalled {
            name: name.to_string(),
        })?;
        self.runner.describe(Path::new(&entry.installation_path))
    }

    /// Compare discovered plugins with the catalog.
    pub fn plugin_status(&self, scope: Scope) -> Result<Vec<PluginStatus>> {
        let catalog = self.catalog.load()?;
        Ok(self
            .discover_plugins(scope)?
            .into_iter()
            .map(|plugin| {
                let installed = catalog.get(plugin.scope, &plugin.name).cloned();
                let state = match &installed {
                    None => InstallState::NotInstalled,
                    Some(d) if is_newer(plugin.recommended_version(), &d.version) => {
                        InstallState::UpdateAvailable
                    }
                    Some(_) => InstallState::Installed,
                };
                PluginStatus {
                    plugin,
                    installed,
                    state,
                }
            })
            .collect())
    }

    /// Install every non-optional plugin that is missing or has an update.
    pub fn sync(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for status in self.plugin_status(Scope::Context)? {
            let name = status.plugin.name.clone();
            match status.state {
                InstallState::Installed => report.up_to_date.push(name),
                _ if status.plugin.optional => report.skipped.push(name),
                _ => report.installed.push(self.install_plugin(&status.plugin, "")?),
            }
        }
        Ok(report)
    }

    /// Best-effort removal of a binary inside the plugin root, plus its
    /// version directory when that becomes empty.
    fn remove_binary(&self, path: &Path) {
        if !self.layout.contains(path) {
            warn!(path = %path.display(), "not removing binary outside the plugin root");
            return;
        }
        if let Err(e) = plugin_fs::io::remove_file_if_exists(path) {
            warn!(path = %path.display(), error = %e, "failed to remove plugin binary");
            return;
        }
        if let Some(dir) = path.parent() {
            if std::fs::remove_dir(dir).is_ok() {
                debug!(dir = %dir.display(), "removed empty version directory");
            }
        }
    }
}

/// Which catalog entries an install replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replace {
    /// Only the entry with the same (scope, name).
    SameScope,
    /// Any entry for the name, in either scope.
    BothScopes,
}

fn other_scope(scope: Scope) -> Scope {
    match scope {
        Scope::Standalone => Scope::Context,
        Scope::Context => Scope::Standalone,
    }
}
