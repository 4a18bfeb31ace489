//! Descriptor validation.

use plugin_fs::validate_path_identifier;

use crate::descriptor::PluginDescriptor;
use crate::error::{Result, ValidationErrors};
use crate::version::{DEV_VERSION, parse_version};

/// Name of the bootstrap plugin, exempt from descriptor checks.
pub const BOOTSTRAP_PLUGIN: &str = "builder";

/// Whether `version` is a semantic version (optionally `v`-prefixed) or `dev`.
pub fn is_valid_version(version: &str) -> bool {
    version == DEV_VERSION || parse_version(version).is_some()
}

/// Check every descriptor rule and report all violations at once.
pub fn validate_descriptor(descriptor: &PluginDescriptor) -> Result<()> {
    if descriptor.name == BOOTSTRAP_PLUGIN {
        return Ok(());
    }

    let mut report = ValidationErrors::new(format!("plugin {:?}", descriptor.name));

    if descriptor.name.trim().is_empty() {
        report.push("name cannot be empty");
    } else if let Err(e) = validate_path_identifier(&descriptor.name) {
        report.push(format!("name is not usable as a path segment: {e}"));
    }

    if descriptor.version.trim().is_empty() {
        report.push("version cannot be empty");
    } else if !is_valid_version(&descriptor.version) {
        report.push(format!(
            "version {:?} is not a valid semantic version",
            descriptor.version
        ));
    } else if let Err(e) = validate_path_identifier(&descriptor.version) {
        report.push(format!("version is not usable as a path segment: {e}"));
    }

    if descriptor.description.trim().is_empty() {
        report.push("description cannot be empty");
    }
    if descriptor.group.trim().is_empty() {
        report.push("group cannot be empty");
    }

    report.into_result()
}
