//! Cross-crate lifecycle tests.
//!
//! Each test wires real discovery, distribution and catalog layers together
//! and drives them through [`PluginManager`]. Plugin binaries are stood in
//! for by their own `info` JSON, read back by [`JsonRunner`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use plugin_core::{ContextConfig, ErrorKind, ManagerConfig, PluginManager, PluginRunner, PostInstall};
use plugin_discovery::{DiscoveryConfig, ObjectStorageDiscoveryConfig, OciDiscoveryConfig};
use plugin_fs::FileLock;
use plugin_fs::lock::lock_path_for;
use plugin_meta::{Manifest, Platform, PluginDescriptor, Scope, validate_descriptor};
use plugin_test_utils::{TestHome, bucket_plugin, descriptor_json};
use plugin_transport::{FsObjectStore, MemoryRegistry, Transports};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures")
        .join(relative)
}

/// Treats the installed file as the output of `info`.
struct JsonRunner;

impl PluginRunner for JsonRunner {
    fn describe(&self, binary: &Path) -> plugin_core::Result<PluginDescriptor> {
        let bytes = std::fs::read(binary).unwrap();
        PluginDescriptor::from_json(&bytes).map_err(|e| plugin_core::Error::Describe {
            binary: binary.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn post_install(&self, _binary: &Path) -> PostInstall {
        PostInstall::Unsupported
    }
}

fn linux_config(home: &TestHome) -> ManagerConfig {
    ManagerConfig::new(home.plugin_root(), home.catalog_path())
        .with_platform(Platform::new("linux", "amd64"))
}

/// Config with one object-storage discovery whose manifest lists `names`,
/// each published at v1.0.0 through the same file:// endpoint.
fn bucket_setup(home: &TestHome, names: &[String]) -> ManagerConfig {
    let endpoint = home.endpoint();
    let manifest = Manifest {
        created: None,
        plugins: names
            .iter()
            .map(|n| bucket_plugin(n, "cli-plugins", Some(&endpoint), "v1.0.0"))
            .collect(),
    };
    home.put_object("discovery", "manifest.yaml", manifest.to_yaml().unwrap());
    for name in names {
        home.put_object(
            "cli-plugins",
            &format!("{name}/v1.0.0/linux/amd64"),
            descriptor_json(name, "v1.0.0"),
        );
    }

    linux_config(home).with_discovery(DiscoveryConfig::object_storage(
        "central",
        ObjectStorageDiscoveryConfig {
            bucket: "discovery".into(),
            manifest_path: String::new(),
            endpoint: Some(endpoint),
        },
    ))
}

fn file_transports() -> Transports {
    Transports::new(Arc::new(FsObjectStore), Arc::new(MemoryRegistry::new()))
}

// =============================================================================
// Fixtures
// =============================================================================

mod fixtures {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_manifest_is_valid() {
        let bytes = std::fs::read(fixture("manifests/registry.yaml")).unwrap();
        let manifest = Manifest::parse(&bytes).unwrap();
        manifest.validate().unwrap();

        let plugins = manifest.into_plugins("oci/prod", Scope::Context);
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "cluster");
        assert!(plugins[0].supports(&Platform::new("darwin", "arm64")));
        assert!(!plugins[0].supports(&Platform::new("windows", "amd64")));
        assert!(plugins[1].optional);
        assert!(plugins.iter().all(|p| p.discovery_source_name == "oci/prod"));
    }

    #[test]
    fn cluster_descriptor_is_valid() {
        let bytes = std::fs::read(fixture("descriptors/cluster-v1.2.0.json")).unwrap();
        let descriptor = PluginDescriptor::from_json(&bytes).unwrap();
        validate_descriptor(&descriptor).unwrap();
        assert_eq!(descriptor.aliases, vec!["cl".to_string()]);
        assert_eq!(descriptor.doc_url.as_deref(), Some("https://docs.example.com/cli/cluster"));
    }
}

// =============================================================================
// Backends end to end
// =============================================================================

mod backends {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn oci_discovery_and_registry_distribution() {
        let home = TestHome::new();
        let registry = Arc::new(MemoryRegistry::new());
        registry.insert(
            "registry.example.com/cli/discovery:latest",
            std::fs::read(fixture("manifests/registry.yaml")).unwrap(),
        );
        registry.insert(
            "harbor.example.com/cli/plugins/cluster/linux-amd64:v1.2.0",
            std::fs::read(fixture("descriptors/cluster-v1.2.0.json")).unwrap(),
        );

        let config = linux_config(&home).with_context(ContextConfig {
            name: "prod".into(),
            discoveries: vec![DiscoveryConfig::oci(
                "prod",
                OciDiscoveryConfig {
                    registry: "registry.example.com".into(),
                    repository: "cli/discovery".into(),
                    tag: None,
                },
            )],
        });
        let manager = PluginManager::new(
            config,
            Transports::new(Arc::new(FsObjectStore), registry),
            Arc::new(JsonRunner),
        );

        let installed = manager.install("cluster", "").unwrap();

        let expected = home
            .plugin_root()
            .join("oci/harbor.example.com/cli/plugins/cluster/cluster/v1.2.0/cluster");
        assert_eq!(installed.installation_path, expected.display().to_string());
        assert_eq!(installed.scope, Scope::Context);
        assert_eq!(installed.discovery, "oci/prod");
        home.assert_exists(&expected);

        let err = manager.install_test("cluster", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn object_storage_discovery_over_file_endpoint() {
        let home = TestHome::new();
        let config = bucket_setup(&home, &["cluster".to_string()]);
        let manager = PluginManager::new(config, file_transports(), Arc::new(JsonRunner));

        let plugins = manager.discover_plugins(Scope::Standalone).unwrap();
        assert_eq!(plugins[0].discovery_source_name, "gcp/central");

        let installed = manager.install("cluster", "").unwrap();
        assert_eq!(installed.version, "v1.0.0");
        assert_eq!(manager.list_installed(Scope::Standalone).unwrap(), vec![installed]);
    }
}

// =============================================================================
// Catalog locking
// =============================================================================

mod locking {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concurrent_installs_from_separate_managers() {
        let home = TestHome::new();
        let names: Vec<String> = (0..6).map(|i| format!("plugin-{i}")).collect();
        let config = bucket_setup(&home, &names);
        let barrier = Arc::new(Barrier::new(names.len()));

        let handles: Vec<_> = names
            .iter()
            .cloned()
            .map(|name| {
                let config = config.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    // One manager per thread, as separate processes would have.
                    let manager = PluginManager::new(config, file_transports(), Arc::new(JsonRunner));
                    barrier.wait();
                    manager.install(&name, "").map(|d| d.name)
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let manager = PluginManager::new(config, file_transports(), Arc::new(JsonRunner));
        let mut installed: Vec<_> = manager
            .list_installed(Scope::Standalone)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        installed.sort();
        assert_eq!(installed, names);
    }

    #[test]
    fn held_lock_fails_install_and_leaves_no_binary() {
        let home = TestHome::new();
        let config = bucket_setup(&home, &["cluster".to_string()])
            .with_lock_timeout(Duration::from_millis(200));
        let manager = PluginManager::new(config, file_transports(), Arc::new(JsonRunner));

        let _held =
            FileLock::acquire(&lock_path_for(&home.catalog_path()), Duration::from_secs(1)).unwrap();

        let err = manager.install("cluster", "").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LockTimeout);
        home.assert_missing(&home.catalog_path());
        home.assert_missing(
            &home
                .plugin_root()
                .join("objects/cli-plugins/cluster/cluster/v1.0.0/cluster"),
        );
    }
}
