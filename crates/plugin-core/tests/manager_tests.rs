//! Manager behaviour against in-memory transports and a runner that reads
//! the "binary" as its own `info` output.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use plugin_core::{
    ContextConfig, ErrorKind, InstallState, ManagerConfig, PluginManager, PluginRunner,
    PostInstall,
};
use plugin_discovery::DiscoveryConfig;
use plugin_meta::{Platform, PluginDescriptor, Scope};
use plugin_test_utils::{TestHome, bucket_plugin, descriptor_json};
use plugin_transport::{MemoryObjectStore, MemoryRegistry, Transports};
use pretty_assertions::assert_eq;

const BUCKET: &str = "cli-plugins";

/// Parses the installed file as `info` JSON instead of executing it.
#[derive(Default)]
struct FakeRunner {
    post_install: Mutex<Option<PostInstall>>,
    post_install_calls: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    fn with_post_install(outcome: PostInstall) -> Self {
        Self {
            post_install: Mutex::new(Some(outcome)),
            ..Default::default()
        }
    }

    fn post_install_calls(&self) -> Vec<PathBuf> {
        self.post_install_calls.lock().unwrap().clone()
    }
}

impl PluginRunner for FakeRunner {
    fn describe(&self, binary: &Path) -> plugin_core::Result<PluginDescriptor> {
        let bytes = std::fs::read(binary).map_err(|e| plugin_core::Error::Describe {
            binary: binary.to_path_buf(),
            reason: e.to_string(),
        })?;
        PluginDescriptor::from_json(&bytes).map_err(|e| plugin_core::Error::Describe {
            binary: binary.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn post_install(&self, binary: &Path) -> PostInstall {
        self.post_install_calls.lock().unwrap().push(binary.to_path_buf());
        self.post_install
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(PostInstall::Unsupported)
    }
}

struct Fixture {
    home: TestHome,
    store: Arc<MemoryObjectStore>,
    runner: Arc<FakeRunner>,
    manager: PluginManager,
}

impl Fixture {
    fn new() -> Self {
        Self::with_runner(FakeRunner::default())
    }

    fn with_runner(runner: FakeRunner) -> Self {
        let home = TestHome::new();
        let manifest = home.write_manifest(
            "default",
            vec![
                bucket_plugin("cluster", BUCKET, None, "v1.2.0"),
                bucket_plugin("login", BUCKET, None, "v1.0.0"),
            ],
        );
        let config = base_config(&home).with_discovery(DiscoveryConfig::local("default", manifest));
        Self::build(home, config, runner)
    }

    fn build(home: TestHome, config: ManagerConfig, runner: FakeRunner) -> Self {
        let store = Arc::new(MemoryObjectStore::new());
        let runner = Arc::new(runner);
        let transports = Transports::new(store.clone(), Arc::new(MemoryRegistry::new()));
        let manager = PluginManager::new(config, transports, runner.clone());
        Self {
            home,
            store,
            runner,
            manager,
        }
    }

    fn publish(&self, name: &str, version: &str) {
        self.publish_bytes(name, version, descriptor_json(name, version));
    }

    fn publish_bytes(&self, name: &str, version: &str, bytes: impl Into<Vec<u8>>) {
        self.store
            .insert(BUCKET, &format!("{name}/{version}/linux/amd64"), bytes);
    }

    fn binary_path(&self, name: &str, version: &str) -> PathBuf {
        self.home
            .plugin_root()
            .join("objects")
            .join(BUCKET)
            .join(name)
            .join(name)
            .join(version)
            .join(name)
    }
}

fn base_config(home: &TestHome) -> ManagerConfig {
    ManagerConfig::new(home.plugin_root(), home.catalog_path())
        .with_platform(Platform::new("linux", "amd64"))
}

#[test]
fn install_recommended_version() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");

    let installed = fx.manager.install("cluster", "").unwrap();

    let binary = fx.binary_path("cluster", "v1.2.0");
    fx.home.assert_exists(&binary);
    assert_eq!(installed.version, "v1.2.0");
    assert_eq!(installed.installation_path, binary.display().to_string());
    assert_eq!(installed.discovery, "local/default");

    let catalog = fx.manager.list_installed(Scope::Standalone).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "cluster");
    assert_eq!(catalog[0].version, "v1.2.0");
    assert_eq!(catalog[0].installation_path, binary.display().to_string());
    assert_eq!(fx.runner.post_install_calls(), vec![binary]);
}

#[cfg(unix)]
#[test]
fn installed_binary_is_executable() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.manager.install("cluster", "").unwrap();

    let mode = std::fs::metadata(fx.binary_path("cluster", "v1.2.0"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn unsupported_version_touches_nothing() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");

    let err = fx.manager.install("cluster", "v9.9.9").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VersionConstraint);
    assert!(err.to_string().contains("v9.9.9"), "{err}");
    assert!(fx.store.requests().is_empty());
    fx.home.assert_missing(&fx.home.plugin_root());
    fx.home.assert_missing(&fx.home.catalog_path());
}

#[test]
fn delete_unknown_plugin_touches_nothing() {
    let fx = Fixture::new();

    let err = fx.manager.delete("cluster").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    fx.home.assert_missing(&fx.home.plugin_root());
    fx.home.assert_missing(&fx.home.catalog_path());
}

#[test]
fn delete_removes_entry_and_binary() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.manager.install("cluster", "").unwrap();

    let removed = fx.manager.delete("cluster").unwrap();

    assert_eq!(removed.version, "v1.2.0");
    let binary = fx.binary_path("cluster", "v1.2.0");
    fx.home.assert_missing(&binary);
    fx.home.assert_missing(binary.parent().unwrap());
    assert!(fx.manager.list_installed(Scope::Standalone).unwrap().is_empty());
}

#[test]
fn reinstall_keeps_single_entry() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");

    fx.manager.install("cluster", "").unwrap();
    fx.manager.install("cluster", "v1.2.0").unwrap();

    assert_eq!(fx.manager.list_installed(Scope::Standalone).unwrap().len(), 1);
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.2.0"));
}

#[test]
fn upgrade_replaces_previous_binary() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.publish("cluster", "v1.3.0");
    fx.manager.install("cluster", "").unwrap();

    let upgraded = fx.manager.upgrade("cluster", "v1.3.0").unwrap();

    assert_eq!(upgraded.version, "v1.3.0");
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.3.0"));
    fx.home.assert_missing(&fx.binary_path("cluster", "v1.2.0"));
    let entries = fx.manager.list_installed(Scope::Standalone).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].version, "v1.3.0");
}

#[test]
fn upgrade_requires_installed_plugin() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.3.0");

    let err = fx.manager.upgrade("cluster", "v1.3.0").unwrap_err();
    assert!(matches!(err, plugin_core::Error::NotInstalled { .. }), "{err}");
    fx.home.assert_missing(&fx.home.plugin_root());
}

#[test]
fn unknown_plugin_is_not_found() {
    let fx = Fixture::new();
    let err = fx.manager.install("nope", "").unwrap_err();
    assert!(matches!(err, plugin_core::Error::PluginNotFound { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn missing_artifact_is_not_found() {
    let fx = Fixture::new();

    let err = fx.manager.install("cluster", "").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    fx.home.assert_missing(&fx.home.catalog_path());
}

#[test]
fn post_install_failure_is_not_fatal() {
    let fx = Fixture::with_runner(FakeRunner::with_post_install(PostInstall::Failed(
        "cannot reach server".into(),
    )));
    fx.publish("cluster", "v1.2.0");

    fx.manager.install("cluster", "").unwrap();

    assert_eq!(fx.manager.list_installed(Scope::Standalone).unwrap().len(), 1);
    assert_eq!(fx.runner.post_install_calls().len(), 1);
}

#[test]
fn unparseable_info_removes_fresh_binary() {
    let fx = Fixture::new();
    fx.publish_bytes("cluster", "v1.2.0", b"\x7fELF not json".to_vec());

    let err = fx.manager.install("cluster", "").unwrap_err();

    assert!(matches!(err, plugin_core::Error::Describe { .. }), "{err}");
    fx.home.assert_missing(&fx.binary_path("cluster", "v1.2.0"));
    fx.home.assert_missing(&fx.home.catalog_path());
    assert!(fx.runner.post_install_calls().is_empty());
}

#[test]
fn invalid_descriptor_reports_every_issue() {
    let fx = Fixture::new();
    fx.publish_bytes(
        "cluster",
        "v1.2.0",
        r#"{"name": "cluster", "version": "latest"}"#,
    );

    let err = fx.manager.install("cluster", "").unwrap_err();
    let message = err.to_string();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(message.contains("not a valid semantic version"), "{message}");
    assert!(message.contains("description cannot be empty"), "{message}");
    assert!(message.contains("group cannot be empty"), "{message}");
    fx.home.assert_missing(&fx.binary_path("cluster", "v1.2.0"));
}

#[test]
fn binary_reporting_another_name_is_rejected() {
    let fx = Fixture::new();
    fx.publish_bytes("cluster", "v1.2.0", descriptor_json("login", "v1.2.0"));

    let err = fx.manager.install("cluster", "").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("\"login\""), "{err}");
    assert!(fx.manager.list_installed(Scope::Standalone).unwrap().is_empty());
}

#[test]
fn unsupported_platform_is_rejected_before_fetch() {
    let home = TestHome::new();
    let mut plugin = bucket_plugin("cluster", BUCKET, None, "v1.2.0");
    plugin.platforms = vec![Platform::new("darwin", "arm64")];
    let manifest = home.write_manifest("default", vec![plugin]);
    let config = base_config(&home).with_discovery(DiscoveryConfig::local("default", manifest));
    let fx = Fixture::build(home, config, FakeRunner::default());

    let err = fx.manager.install("cluster", "").unwrap_err();

    assert!(matches!(err, plugin_core::Error::UnsupportedPlatform { .. }), "{err}");
    assert!(fx.store.requests().is_empty());
}

#[test]
fn context_sources_shadow_standalone_ones() {
    let home = TestHome::new();
    let standalone = home.write_manifest(
        "standalone",
        vec![
            bucket_plugin("cluster", BUCKET, None, "v1.2.0"),
            bucket_plugin("login", BUCKET, None, "v1.0.0"),
        ],
    );
    let context = home.write_manifest("context", vec![bucket_plugin("cluster", BUCKET, None, "v1.3.0")]);
    let config = base_config(&home)
        .with_discovery(DiscoveryConfig::local("default", standalone))
        .with_context(ContextConfig {
            name: "prod".into(),
            discoveries: vec![DiscoveryConfig::local("prod", context)],
        });
    let fx = Fixture::build(home, config, FakeRunner::default());

    let merged = fx.manager.discover_plugins(Scope::Context).unwrap();
    let summary: Vec<_> = merged
        .iter()
        .map(|p| (p.name.as_str(), p.recommended_version(), p.scope))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("cluster", "v1.3.0", Scope::Context),
            ("login", "v1.0.0", Scope::Standalone),
        ]
    );

    let standalone_only = fx.manager.discover_plugins(Scope::Standalone).unwrap();
    assert_eq!(standalone_only.len(), 2);
    assert!(standalone_only.iter().all(|p| p.scope == Scope::Standalone));

    fx.publish("cluster", "v1.3.0");
    let installed = fx.manager.install("cluster", "").unwrap();
    assert_eq!(installed.scope, Scope::Context);
    assert_eq!(installed.discovery, "local/prod");
    assert_eq!(fx.manager.list_installed(Scope::Context).unwrap().len(), 1);
    assert!(fx.manager.list_installed(Scope::Standalone).unwrap().is_empty());
}

/// A manager whose context lists `cluster` at `context_version`, plus a
/// manager without a context that shares its home and object store.
fn two_scope_managers(context_version: &str) -> (Fixture, PluginManager) {
    let home = TestHome::new();
    let standalone = home.write_manifest("standalone", vec![bucket_plugin("cluster", BUCKET, None, "v1.2.0")]);
    let context = home.write_manifest("context", vec![bucket_plugin("cluster", BUCKET, None, context_version)]);
    let standalone_config =
        base_config(&home).with_discovery(DiscoveryConfig::local("default", standalone));
    let config = standalone_config.clone().with_context(ContextConfig {
        name: "prod".into(),
        discoveries: vec![DiscoveryConfig::local("prod", context)],
    });
    let fx = Fixture::build(home, config, FakeRunner::default());
    let transports = Transports::new(fx.store.clone(), Arc::new(MemoryRegistry::new()));
    let standalone_manager = PluginManager::new(standalone_config, transports, fx.runner.clone());
    (fx, standalone_manager)
}

#[test]
fn delete_keeps_binary_shared_with_other_scope() {
    let (fx, standalone_manager) = two_scope_managers("v1.2.0");
    fx.publish("cluster", "v1.2.0");
    let standalone = standalone_manager.install("cluster", "").unwrap();
    let context = fx.manager.install("cluster", "").unwrap();
    assert_eq!(standalone.scope, Scope::Standalone);
    assert_eq!(context.scope, Scope::Context);
    assert_eq!(standalone.installation_path, context.installation_path);

    let removed = fx.manager.delete("cluster").unwrap();

    assert_eq!(removed.scope, Scope::Context);
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.2.0"));
    assert_eq!(fx.manager.list_installed(Scope::Standalone).unwrap(), vec![standalone]);
    assert_eq!(fx.manager.describe_installed("cluster").unwrap().version, "v1.2.0");

    let removed = fx.manager.delete("cluster").unwrap();

    assert_eq!(removed.scope, Scope::Standalone);
    fx.home.assert_missing(&fx.binary_path("cluster", "v1.2.0"));
    assert!(fx.manager.catalog().load().unwrap().is_empty());
}

#[test]
fn upgrade_moves_standalone_entry_to_context_source() {
    let (fx, standalone_manager) = two_scope_managers("v1.3.0");
    fx.publish("cluster", "v1.2.0");
    fx.publish("cluster", "v1.3.0");
    standalone_manager.install("cluster", "").unwrap();

    let upgraded = fx.manager.upgrade("cluster", "").unwrap();

    assert_eq!(upgraded.version, "v1.3.0");
    assert_eq!(upgraded.scope, Scope::Context);
    let entries: Vec<_> = fx
        .manager
        .catalog()
        .load()
        .unwrap()
        .plugins()
        .iter()
        .map(|d| (d.version.clone(), d.scope))
        .collect();
    assert_eq!(entries, vec![("v1.3.0".to_string(), Scope::Context)]);
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.3.0"));
    fx.home.assert_missing(&fx.binary_path("cluster", "v1.2.0"));
}

#[test]
fn install_in_second_scope_keeps_first_entry() {
    let (fx, standalone_manager) = two_scope_managers("v1.3.0");
    fx.publish("cluster", "v1.2.0");
    fx.publish("cluster", "v1.3.0");
    standalone_manager.install("cluster", "").unwrap();

    fx.manager.install("cluster", "").unwrap();

    assert_eq!(fx.manager.list_installed(Scope::Standalone).unwrap().len(), 1);
    assert_eq!(fx.manager.list_installed(Scope::Context).unwrap().len(), 1);
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.2.0"));
    fx.home.assert_exists(&fx.binary_path("cluster", "v1.3.0"));
}

#[test]
fn broken_discovery_names_the_source() {
    let home = TestHome::new();
    let config = base_config(&home)
        .with_discovery(DiscoveryConfig::local("missing", home.root().join("nope.yaml")));
    let fx = Fixture::build(home, config, FakeRunner::default());

    let err = fx.manager.discover_plugins(Scope::Standalone).unwrap_err();
    assert!(matches!(err, plugin_core::Error::Discovery { ref name, .. } if name == "missing"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn status_reports_available_updates() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.manager.install("cluster", "").unwrap();

    fx.home.write_manifest(
        "default",
        vec![
            bucket_plugin("cluster", BUCKET, None, "v1.3.0"),
            bucket_plugin("login", BUCKET, None, "v1.0.0"),
        ],
    );

    let status = fx.manager.plugin_status(Scope::Standalone).unwrap();
    let states: Vec<_> = status
        .iter()
        .map(|s| (s.plugin.name.as_str(), s.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("cluster", InstallState::UpdateAvailable),
            ("login", InstallState::NotInstalled),
        ]
    );
    assert_eq!(status[0].installed.as_ref().unwrap().version, "v1.2.0");
}

#[test]
fn sync_installs_required_and_skips_optional() {
    let home = TestHome::new();
    let mut login = bucket_plugin("login", BUCKET, None, "v1.0.0");
    login.optional = true;
    let manifest = home.write_manifest(
        "default",
        vec![bucket_plugin("cluster", BUCKET, None, "v1.2.0"), login],
    );
    let config = base_config(&home).with_discovery(DiscoveryConfig::local("default", manifest));
    let fx = Fixture::build(home, config, FakeRunner::default());
    fx.publish("cluster", "v1.2.0");

    let report = fx.manager.sync().unwrap();
    let installed: Vec<_> = report.installed.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(installed, vec!["cluster"]);
    assert_eq!(report.skipped, vec!["login".to_string()]);

    let again = fx.manager.sync().unwrap();
    assert!(again.installed.is_empty());
    assert_eq!(again.up_to_date, vec!["cluster".to_string()]);
}

#[test]
fn clean_removes_everything() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.publish("login", "v1.0.0");
    fx.manager.install("cluster", "").unwrap();
    fx.manager.install("login", "").unwrap();

    fx.manager.clean().unwrap();

    fx.home.assert_missing(&fx.home.plugin_root());
    fx.home.assert_missing(&fx.home.catalog_path());
    assert!(fx.manager.list_installed(Scope::Standalone).unwrap().is_empty());
}

#[test]
fn describe_installed_runs_info() {
    let fx = Fixture::new();
    fx.publish("cluster", "v1.2.0");
    fx.manager.install("cluster", "").unwrap();

    let described = fx.manager.describe_installed("cluster").unwrap();
    assert_eq!(described.version, "v1.2.0");
    assert_eq!(described.build_sha.as_deref(), Some("0123abcd"));

    let err = fx.manager.describe_installed("login").unwrap_err();
    assert!(matches!(err, plugin_core::Error::NotInstalled { .. }));
}

#[test]
fn install_test_places_binary_under_test_dir() {
    let fx = Fixture::new();
    fx.store
        .insert(BUCKET, "cluster/v1.2.0/test/linux/amd64", b"test-binary".to_vec());

    let path = fx.manager.install_test("cluster", "").unwrap();

    let expected = fx
        .binary_path("cluster", "v1.2.0")
        .parent()
        .unwrap()
        .join("test")
        .join("cluster");
    assert_eq!(path, expected);
    assert_eq!(std::fs::read(&path).unwrap(), b"test-binary");
    assert!(fx.manager.list_installed(Scope::Standalone).unwrap().is_empty());
}

#[test]
fn validate_accepts_bootstrap_plugin() {
    let fx = Fixture::new();
    let builder = PluginDescriptor {
        name: "builder".into(),
        ..Default::default()
    };
    fx.manager.validate(&builder).unwrap();

    let err = fx.manager.validate(&PluginDescriptor::default()).unwrap_err();
    assert!(err.to_string().contains("name cannot be empty"), "{err}");
}
