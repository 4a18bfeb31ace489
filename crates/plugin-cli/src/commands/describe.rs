//! Describe and validate commands

use std::path::Path;

use colored::Colorize;
use plugin_core::PluginManager;
use plugin_meta::{PluginDescriptor, validate_descriptor};

use crate::error::Result;

/// Run the describe command
pub fn run_describe(manager: &PluginManager, name: &str, json: bool) -> Result<()> {
    let descriptor = manager.describe_installed(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("{}", descriptor.name.bold());
    println!();
    println!("{}:     {}", "Version".dimmed(), descriptor.version);
    println!("{}: {}", "Description".dimmed(), descriptor.description);
    println!("{}:       {}", "Group".dimmed(), descriptor.group);
    if let Some(target) = &descriptor.target {
        println!("{}:      {}", "Target".dimmed(), target);
    }
    if let Some(sha) = &descriptor.build_sha {
        println!("{}:   {}", "Build SHA".dimmed(), sha);
    }
    if let Some(url) = &descriptor.doc_url {
        println!("{}:        {}", "Docs".dimmed(), url);
    }
    if !descriptor.aliases.is_empty() {
        println!("{}:     {}", "Aliases".dimmed(), descriptor.aliases.join(", "));
    }
    Ok(())
}

/// Run the validate command
pub fn run_validate(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let descriptor = PluginDescriptor::from_json(&bytes)?;
    validate_descriptor(&descriptor)?;
    println!("{} {} is valid", "ok".green().bold(), descriptor.name.cyan());
    Ok(())
}
