//! Builders for manifest records and `info` output.

use plugin_meta::{DistributionConfig, ManifestPlugin, ObjectStorageConfig, VersionConstraints};

/// A manifest record distributed from `bucket` under `base_path = name`.
///
/// The record supports `v1.x` and recommends `recommended`.
pub fn bucket_plugin(name: &str, bucket: &str, endpoint: Option<&str>, recommended: &str) -> ManifestPlugin {
    ManifestPlugin {
        name: name.to_string(),
        description: format!("{name} plugin"),
        distribution: DistributionConfig::object_storage(ObjectStorageConfig {
            bucket: bucket.to_string(),
            base_path: name.to_string(),
            endpoint: endpoint.map(str::to_string),
        }),
        version_constraints: VersionConstraints::new(recommended, ["v1.x"]),
        platforms: Vec::new(),
        optional: false,
    }
}

/// The JSON a well-behaved plugin prints for `info`.
pub fn descriptor_json(name: &str, version: &str) -> String {
    serde_json::json!({
        "name": name,
        "version": version,
        "description": format!("{name} plugin"),
        "group": "Run",
        "buildSHA": "0123abcd",
    })
    .to_string()
}
