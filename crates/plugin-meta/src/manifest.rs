//! The manifest document a discovery source publishes.
//!
//! ```yaml
//! created: 2024-05-01T10:00:00Z
//! plugins:
//!   - name: cluster
//!     description: Cluster operations
//!     distribution:
//!       objectStorage:
//!         bucket: cli-plugins
//!         basePath: cluster
//!     versionConstraints:
//!       recommendedVersion: v1.2.0
//!       supportedVersions: ["v1.x"]
//!     platforms:
//!       - { os: linux, arch: amd64 }
//! ```

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::distribution::DistributionConfig;
use crate::error::{Result, ValidationErrors};
use crate::platform::{Platform, Scope};
use crate::plugin::Plugin;
use crate::version::VersionConstraints;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Informational; a timestamp that does not parse is dropped.
    #[serde(
        default,
        alias = "createdTime",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plugins: Vec<ManifestPlugin>,
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_yaml::Value::as_str).and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// One plugin record in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPlugin {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub version_constraints: VersionConstraints,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Manifest {
    /// Parse manifest YAML (JSON is accepted too, being a YAML subset).
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every record, reporting all problems together.
    ///
    /// Names must be unique and usable as path segments, each distribution
    /// must resolve to exactly one variant, and version constraints must be
    /// consistent.
    pub fn validate(&self) -> Result<()> {
        let mut report = ValidationErrors::new("manifest");
        let mut seen = HashSet::new();

        for plugin in &self.plugins {
            let mut entry = ValidationErrors::new(format!("plugin {:?}", plugin.name));

            if plugin.name.trim().is_empty() {
                entry.push("name cannot be empty");
            } else if let Err(e) = plugin_fs::validate_path_identifier(&plugin.name) {
                entry.push(e.to_string());
            } else if !seen.insert(plugin.name.as_str()) {
                entry.push("listed more than once");
            }

            if let Err(e) = plugin.distribution.resolve() {
                entry.push(e.to_string());
            }

            match plugin.version_constraints.validate() {
                Ok(()) => {}
                Err(crate::Error::Validation(inner)) => entry.absorb(inner),
                Err(e) => entry.push(e.to_string()),
            }

            report.absorb(entry);
        }

        report.into_result()
    }

    /// Convert the records into [`Plugin`]s stamped with their source.
    pub fn into_plugins(self, discovery_source_name: &str, scope: Scope) -> Vec<Plugin> {
        self.plugins
            .into_iter()
            .map(|p| Plugin {
                name: p.name,
                description: p.description,
                distribution: p.distribution,
                version_constraints: p.version_constraints,
                platforms: p.platforms,
                discovery_source_name: discovery_source_name.to_string(),
                scope,
                optional: p.optional,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const MANIFEST: &str = r#"
createdTime: 2024-05-01T10:00:00Z
plugins:
  - name: cluster
    description: Cluster operations
    distribution:
      objectStorage:
        bucket: cli-plugins
        basePath: cluster
    versionConstraints:
      recommendedVersion: v1.2.0
      supportedVersions: ["v1.x"]
    platforms:
      - { os: linux, arch: amd64 }
"#;

    #[rstest]
    #[case::rfc3339("createdTime: 2024-05-01T10:00:00Z", Some("2024-05-01T10:00:00+00:00"))]
    #[case::offset("created: 2024-05-01T12:00:00+02:00", Some("2024-05-01T10:00:00+00:00"))]
    #[case::bare_date("createdTime: 2024-05-01", Some("2024-05-01T00:00:00+00:00"))]
    #[case::free_text("createdTime: last tuesday", None)]
    #[case::number("createdTime: 20240501", None)]
    #[case::null("createdTime: ~", None)]
    fn created_time_is_parsed_leniently(#[case] header: &str, #[case] expected: Option<&str>) {
        let yaml = format!("{header}\nplugins: []\n");
        let manifest = Manifest::parse(yaml.as_bytes()).unwrap();
        assert_eq!(manifest.created.map(|t| t.to_rfc3339()).as_deref(), expected);
    }

    #[test]
    fn parses_and_validates() {
        let manifest = Manifest::parse(MANIFEST.as_bytes()).unwrap();
        manifest.validate().unwrap();
        assert!(manifest.created.is_some());
        assert_eq!(manifest.plugins.len(), 1);
        assert_eq!(
            manifest.plugins[0].version_constraints.supported_versions,
            vec!["v1.x".to_string()]
        );
    }

    #[test]
    fn into_plugins_stamps_source_and_scope() {
        let plugins = Manifest::parse(MANIFEST.as_bytes())
            .unwrap()
            .into_plugins("local/default", Scope::Context);
        assert_eq!(plugins[0].discovery_source_name, "local/default");
        assert_eq!(plugins[0].scope, Scope::Context);
    }

    #[test]
    fn validate_aggregates_across_plugins() {
        let yaml = r#"
plugins:
  - name: a
    versionConstraints:
      recommendedVersion: v2.0.0
      supportedVersions: ["v1.x"]
    distribution:
      objectStorage: { bucket: b }
  - name: a
    distribution: {}
"#;
        let manifest = Manifest::parse(yaml.as_bytes()).unwrap();
        let crate::Error::Validation(report) = manifest.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        let text = report.to_string();
        assert!(text.contains("does not satisfy"), "{text}");
        assert!(text.contains("listed more than once"), "{text}");
        assert!(text.contains("no distribution"), "{text}");
    }

    #[test]
    fn empty_document_is_empty_manifest() {
        let manifest = Manifest::parse(b"{}").unwrap();
        assert_eq!(manifest, Manifest::default());
    }
}
