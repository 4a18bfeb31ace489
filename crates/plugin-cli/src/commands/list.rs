//! List commands for discovered and installed plugins

use colored::Colorize;
use plugin_core::{InstallState, PluginManager};
use plugin_meta::Scope;
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRow<'a> {
    name: &'a str,
    description: &'a str,
    recommended_version: &'a str,
    installed_version: Option<&'a str>,
    scope: Scope,
    discovery: &'a str,
    status: &'static str,
}

fn state_label(state: InstallState) -> &'static str {
    match state {
        InstallState::NotInstalled => "not installed",
        InstallState::Installed => "installed",
        InstallState::UpdateAvailable => "update available",
    }
}

fn scope_for(standalone: bool) -> Scope {
    if standalone {
        Scope::Standalone
    } else {
        Scope::Context
    }
}

/// Run the list command
pub fn run_list(manager: &PluginManager, standalone: bool, json: bool) -> Result<()> {
    let statuses = manager.plugin_status(scope_for(standalone))?;

    if json {
        let rows: Vec<_> = statuses
            .iter()
            .map(|s| StatusRow {
                name: &s.plugin.name,
                description: &s.plugin.description,
                recommended_version: s.plugin.recommended_version(),
                installed_version: s.installed.as_ref().map(|d| d.version.as_str()),
                scope: s.plugin.scope,
                discovery: &s.plugin.discovery_source_name,
                status: state_label(s.state),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("{}", "No plugins discovered.".dimmed());
        return Ok(());
    }

    println!("{}", "Plugins".bold());
    println!();
    for status in &statuses {
        let label = state_label(status.state);
        let label = match status.state {
            InstallState::Installed => label.green(),
            InstallState::UpdateAvailable => label.yellow(),
            InstallState::NotInstalled => label.dimmed(),
        };
        let version = match &status.installed {
            Some(d) if status.state == InstallState::UpdateAvailable => {
                format!("{} -> {}", d.version, status.plugin.recommended_version())
            }
            Some(d) => d.version.clone(),
            None => status.plugin.recommended_version().to_string(),
        };
        println!(
            "  {:<20} {:<20} {:<11} {}",
            status.plugin.name.cyan(),
            version,
            status.plugin.scope.as_str(),
            label
        );
    }
    Ok(())
}

/// Run the list command with `--installed`
pub fn run_list_installed(manager: &PluginManager, standalone: bool, json: bool) -> Result<()> {
    let mut installed = manager.list_installed(Scope::Standalone)?;
    if !standalone {
        installed.extend(manager.list_installed(Scope::Context)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&installed)?);
        return Ok(());
    }

    if installed.is_empty() {
        println!("{} (use {} to add one)", "No plugins installed.".dimmed(), "pluginctl install".cyan());
        return Ok(());
    }

    println!("{}", "Installed Plugins".bold());
    println!();
    for descriptor in &installed {
        println!(
            "  {:<20} {:<12} {:<11} {}",
            descriptor.name.cyan(),
            descriptor.version,
            descriptor.scope.as_str(),
            descriptor.installation_path.dimmed()
        );
    }
    Ok(())
}
