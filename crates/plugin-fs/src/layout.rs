//! On-disk layout of installed plugin binaries.
//!
//! ```text
//! <root>/<installation-path>/<name>/<version>/<name>[.exe]
//! <root>/<installation-path>/<name>/<version>/test/<name>[.exe]
//! ```

use std::path::{Path, PathBuf};

use crate::constants::{TEST_DIR_NAME, WINDOWS_EXE_SUFFIX};
use crate::{Result, relative_path, validate_path_identifier};

/// Resolves binary locations beneath a plugin root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLayout {
    root: PathBuf,
}

impl PluginLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every version of `name` for one distribution.
    pub fn plugin_dir(&self, installation_path: &str, name: &str) -> Result<PathBuf> {
        validate_path_identifier(name)?;
        Ok(self.root.join(relative_path(installation_path)?).join(name))
    }

    /// Full path of the binary for `name` at `version`.
    ///
    /// Every component is validated, so metadata from a discovery source can
    /// never place a binary outside the root.
    pub fn binary_path(
        &self,
        installation_path: &str,
        name: &str,
        version: &str,
        windows: bool,
    ) -> Result<PathBuf> {
        validate_path_identifier(version)?;
        let dir = self.plugin_dir(installation_path, name)?.join(version);
        Ok(dir.join(binary_name(name, windows)))
    }

    /// Path of the self-test binary for `name` at `version`.
    pub fn test_binary_path(
        &self,
        installation_path: &str,
        name: &str,
        version: &str,
        windows: bool,
    ) -> Result<PathBuf> {
        validate_path_identifier(version)?;
        let dir = self
            .plugin_dir(installation_path, name)?
            .join(version)
            .join(TEST_DIR_NAME);
        Ok(dir.join(binary_name(name, windows)))
    }

    /// Whether `path` lies inside the root.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

fn binary_name(name: &str, windows: bool) -> String {
    if windows {
        format!("{name}{WINDOWS_EXE_SUFFIX}")
    } else {
        name.to_string()
    }
}
