//! Install, upgrade and fetch-test commands

use colored::Colorize;
use plugin_core::PluginManager;

use crate::error::Result;

fn requested(version: &str) -> &str {
    if version.is_empty() { "recommended" } else { version }
}

/// Run the install command
pub fn run_install(manager: &PluginManager, name: &str, version: &str) -> Result<()> {
    tracing::debug!(plugin = name, version = requested(version), "install requested");
    let descriptor = manager.install(name, version)?;
    println!(
        "{} Installed {} {}",
        "+".green().bold(),
        descriptor.name.cyan(),
        descriptor.version
    );
    Ok(())
}

/// Run the upgrade command
pub fn run_upgrade(manager: &PluginManager, name: &str, version: &str) -> Result<()> {
    tracing::debug!(plugin = name, version = requested(version), "upgrade requested");
    let descriptor = manager.upgrade(name, version)?;
    println!(
        "{} Upgraded {} to {}",
        "+".green().bold(),
        descriptor.name.cyan(),
        descriptor.version
    );
    Ok(())
}

/// Run the fetch-test command
pub fn run_fetch_test(manager: &PluginManager, name: &str, version: &str) -> Result<()> {
    let path = manager.install_test(name, version)?;
    println!(
        "{} Test binary for {} at {}",
        "+".green().bold(),
        name.cyan(),
        path.display()
    );
    Ok(())
}
