//! Command implementations for plugin-cli

pub mod describe;
pub mod install;
pub mod list;
pub mod remove;
pub mod sync;

use std::path::Path;

use plugin_core::{ClientConfig, ManagerConfig, PluginManager};

use crate::error::Result;

pub use describe::{run_describe, run_validate};
pub use install::{run_fetch_test, run_install, run_upgrade};
pub use list::{run_list, run_list_installed};
pub use remove::{run_clean, run_delete};
pub use sync::run_sync;

/// Build a manager from the discovered configuration file.
pub fn load_manager(config: Option<&Path>) -> Result<PluginManager> {
    let client = ClientConfig::discover(config)?;
    let resolved = ManagerConfig::from_client_config(&client)?;
    tracing::debug!(
        plugin_root = %resolved.plugin_root.display(),
        catalog = %resolved.catalog_path.display(),
        discoveries = resolved.discoveries.len(),
        context = resolved.context.as_ref().map(|c| c.name.as_str()).unwrap_or("-"),
        "loaded configuration"
    );
    Ok(PluginManager::with_defaults(resolved)?)
}
