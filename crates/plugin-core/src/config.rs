//! Manager configuration.
//!
//! [`ClientConfig`] is the on-disk document; [`ManagerConfig`] is the
//! resolved value handed to [`PluginManager`](crate::PluginManager). There is
//! no process-wide state: every path and discovery the manager touches comes
//! from the `ManagerConfig` it was built with.
//!
//! ```toml
//! pluginRoot = "/home/me/.local/share/pluginctl/plugins"
//! lockTimeoutSecs = 10
//! currentContext = "prod"
//! insecureRegistries = ["localhost:5000"]
//!
//! [[discoveries]]
//! name = "default"
//! [discoveries.local]
//! path = "/etc/pluginctl/manifest.yaml"
//!
//! [[contexts]]
//! name = "prod"
//! [[contexts.discoveries]]
//! name = "prod-registry"
//! [contexts.discoveries.oci]
//! registry = "harbor.example.com"
//! repository = "cli/discovery"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use plugin_discovery::DiscoveryConfig;
use plugin_fs::ConfigStore;
use plugin_fs::constants::CATALOG_FILE_NAME;
use plugin_meta::Platform;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Application directory name under the platform config/data/cache dirs.
pub const APP_DIR: &str = "pluginctl";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PLUGINCTL_CONFIG";

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote server context and the discoveries it contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    pub name: String,
    #[serde(default)]
    pub discoveries: Vec<DiscoveryConfig>,
}

/// On-disk client configuration (TOML, YAML or JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_secs: Option<u64>,
    /// Standalone discoveries, always consulted.
    #[serde(default)]
    pub discoveries: Vec<DiscoveryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,
    #[serde(default)]
    pub contexts: Vec<ContextConfig>,
    /// Registries pulled over plain HTTP instead of HTTPS.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insecure_registries: Vec<String>,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Locate and load the configuration.
    ///
    /// Lookup order: `explicit`, then `$PLUGINCTL_CONFIG`, then
    /// `<config_dir>/pluginctl/config.toml`. An explicitly named file must
    /// exist; a missing default file yields an empty configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading explicit config");
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "loading config from {CONFIG_ENV}");
            return Self::load(&path);
        }
        match Self::default_path() {
            Some(path) => {
                debug!(path = %path.display(), "loading default config");
                Ok(ConfigStore::new().load_optional(&path)?.unwrap_or_default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }
}

/// Resolved configuration for one manager instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub plugin_root: PathBuf,
    pub catalog_path: PathBuf,
    pub lock_timeout: Duration,
    /// Platform binaries are fetched for.
    pub platform: Platform,
    /// Standalone discoveries.
    pub discoveries: Vec<DiscoveryConfig>,
    /// Current context, whose discoveries take priority.
    pub context: Option<ContextConfig>,
    pub insecure_registries: Vec<String>,
}

impl ManagerConfig {
    pub fn new(plugin_root: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            plugin_root: plugin_root.into(),
            catalog_path: catalog_path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            platform: Platform::host(),
            discoveries: Vec::new(),
            context: None,
            insecure_registries: Vec::new(),
        }
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discoveries.push(discovery);
        self
    }

    pub fn with_context(mut self, context: ContextConfig) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Resolve a client configuration, filling platform defaults.
    pub fn from_client_config(config: &ClientConfig) -> Result<Self> {
        let plugin_root = match &config.plugin_root {
            Some(root) => root.clone(),
            None => dirs::data_local_dir()
                .ok_or_else(|| Error::config("cannot determine a data directory for the plugin root"))?
                .join(APP_DIR)
                .join("plugins"),
        };
        let catalog_path = match &config.catalog_path {
            Some(path) => path.clone(),
            None => dirs::cache_dir()
                .ok_or_else(|| Error::config("cannot determine a cache directory for the catalog"))?
                .join(APP_DIR)
                .join(CATALOG_FILE_NAME),
        };

        let context = match &config.current_context {
            None => None,
            Some(name) => Some(
                config
                    .contexts
                    .iter()
                    .find(|c| &c.name == name)
                    .cloned()
                    .ok_or_else(|| Error::config(format!("current context '{name}' is not defined")))?,
            ),
        };

        let mut resolved = Self::new(plugin_root, catalog_path);
        resolved.discoveries = config.discoveries.clone();
        resolved.context = context;
        resolved.insecure_registries = config.insecure_registries.clone();
        if let Some(secs) = config.lock_timeout_secs {
            resolved.lock_timeout = Duration::from_secs(secs);
        }
        Ok(resolved)
    }
}
