//! Installed plugin descriptor, reported by the plugin binary itself.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::Scope;

/// Authoritative metadata for an installed plugin.
///
/// Produced by parsing the JSON the binary prints for `info`; the manager
/// stamps `installation_path`, `discovery` and `scope` before persisting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(rename = "buildSHA", default, skip_serializing_if = "Option::is_none")]
    pub build_sha: Option<String>,
    #[serde(rename = "docURL", default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Absolute path of the installed binary.
    #[serde(default)]
    pub installation_path: String,
    /// Discovery source the plugin was installed from.
    #[serde(default)]
    pub discovery: String,
    #[serde(default)]
    pub scope: Scope,
}

impl PluginDescriptor {
    /// Parse the output of a plugin's `info` command.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
