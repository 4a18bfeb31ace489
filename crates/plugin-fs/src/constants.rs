//! Well-known file names under the plugin root and cache directories.

/// File name of the persisted catalog.
pub const CATALOG_FILE_NAME: &str = "catalog.yaml";

/// File name a local discovery reads when pointed at a directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.yaml";

/// Executable suffix appended on Windows hosts.
pub const WINDOWS_EXE_SUFFIX: &str = ".exe";

/// Subdirectory of an installed version holding self-test binaries.
pub const TEST_DIR_NAME: &str = "test";
