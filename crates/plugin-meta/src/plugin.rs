//! A plugin as advertised by a discovery source.

use serde::{Deserialize, Serialize};

use crate::distribution::DistributionConfig;
use crate::platform::{Platform, Scope};
use crate::version::VersionConstraints;

/// A discovered plugin. Exists only while its discovery source reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub version_constraints: VersionConstraints,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// `"{type}/{name}"` of the discovery that reported this plugin.
    #[serde(default)]
    pub discovery_source_name: String,
    #[serde(default)]
    pub scope: Scope,
    /// Optional plugins are skipped by bulk installs.
    #[serde(default)]
    pub optional: bool,
}

impl Plugin {
    /// Whether a binary is published for `platform`.
    ///
    /// A plugin that declares no platforms is assumed to support all of them.
    pub fn supports(&self, platform: &Platform) -> bool {
        self.platforms.is_empty() || self.platforms.contains(platform)
    }

    pub fn recommended_version(&self) -> &str {
        &self.version_constraints.recommended_version
    }
}
