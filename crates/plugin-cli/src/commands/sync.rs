//! Sync command

use colored::Colorize;
use plugin_core::PluginManager;

use crate::error::Result;

/// Run the sync command
pub fn run_sync(manager: &PluginManager) -> Result<()> {
    let report = manager.sync()?;

    for descriptor in &report.installed {
        println!(
            "{} Installed {} {}",
            "+".green().bold(),
            descriptor.name.cyan(),
            descriptor.version
        );
    }
    for name in &report.skipped {
        println!("  {} {} (optional)", "skipped".dimmed(), name);
    }

    if report.installed.is_empty() {
        println!("{}", "All plugins are up to date.".green());
    }
    Ok(())
}
