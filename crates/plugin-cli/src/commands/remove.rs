//! Delete and clean commands

use colored::Colorize;
use plugin_core::PluginManager;

use crate::error::Result;

/// Run the delete command
pub fn run_delete(manager: &PluginManager, name: &str) -> Result<()> {
    let removed = manager.delete(name)?;
    println!(
        "{} Deleted {} {}",
        "-".red().bold(),
        removed.name.cyan(),
        removed.version
    );
    Ok(())
}

/// Run the clean command
pub fn run_clean(manager: &PluginManager) -> Result<()> {
    manager.clean()?;
    println!(
        "{} Removed all plugins from {}",
        "-".red().bold(),
        manager.config().plugin_root.display()
    );
    Ok(())
}
