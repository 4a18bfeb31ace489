//! Lock-scoped persistence for the catalog.
//!
//! Every operation takes an exclusive advisory lock on `<catalog>.lock`
//! before touching the file and holds it until the operation returns, so
//! concurrent processes serialize their load-modify-save cycles. Failing to
//! get the lock within the timeout is an error; nothing is written unlocked.

use std::path::{Path, PathBuf};
use std::time::Duration;

use plugin_fs::FileLock;
use plugin_fs::lock::lock_path_for;
use plugin_meta::{PluginDescriptor, Scope};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    plugin_root: PathBuf,
    lock_timeout: Duration,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>, plugin_root: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            plugin_root: plugin_root.into(),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plugin_root(&self) -> &Path {
        &self.plugin_root
    }

    fn lock(&self) -> Result<FileLock> {
        Ok(FileLock::acquire(&lock_path_for(&self.path), self.lock_timeout)?)
    }

    /// Read the catalog; an absent or empty file is an empty catalog.
    pub fn load(&self) -> Result<Catalog> {
        let _guard = self.lock()?;
        self.read()
    }

    /// Overwrite the catalog file, creating its directory if needed.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let _guard = self.lock()?;
        self.write(catalog)
    }

    /// Load, apply `f`, and save, all under one lock acquisition.
    ///
    /// When `f` reports no change the file is left untouched.
    pub fn update<T>(&self, f: impl FnOnce(&mut Catalog) -> (T, bool)) -> Result<T> {
        let _guard = self.lock()?;
        let mut catalog = self.read()?;
        let (value, changed) = f(&mut catalog);
        if changed {
            self.write(&catalog)?;
        }
        Ok(value)
    }

    /// Insert or replace the (scope, name) entry. Returns the replaced entry.
    pub fn upsert_entry(&self, scope: Scope, descriptor: PluginDescriptor) -> Result<Option<PluginDescriptor>> {
        debug!(%scope, plugin = %descriptor.name, version = %descriptor.version, "upserting catalog entry");
        self.update(|catalog| (catalog.upsert(scope, descriptor), true))
    }

    /// Remove the (scope, name) entry if present. Removing an absent entry
    /// changes nothing.
    pub fn remove_entry(&self, scope: Scope, name: &str) -> Result<Option<PluginDescriptor>> {
        debug!(%scope, plugin = name, "removing catalog entry");
        self.update(|catalog| {
            let removed = catalog.remove(scope, name);
            let changed = removed.is_some();
            (removed, changed)
        })
    }

    /// Delete the catalog file and the whole plugin root.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        plugin_fs::io::remove_file_if_exists(&self.path)?;
        plugin_fs::io::remove_dir_all_if_exists(&self.plugin_root)?;
        debug!(catalog = %self.path.display(), root = %self.plugin_root.display(), "cleared catalog");
        Ok(())
    }

    pub fn entries(&self, scope: Scope) -> Result<Vec<PluginDescriptor>> {
        Ok(self.load()?.entries(scope).cloned().collect())
    }

    /// Installed entry named `name`, preferring the context scope.
    pub fn find(&self, name: &str) -> Result<Option<PluginDescriptor>> {
        Ok(self.load()?.find(name).cloned())
    }

    fn read(&self) -> Result<Catalog> {
        match plugin_fs::io::read_optional(&self.path)? {
            Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
                serde_yaml::from_slice(&bytes).map_err(|source| Error::Parse {
                    path: self.path.clone(),
                    source,
                })
            }
            _ => Ok(Catalog::new()),
        }
    }

    fn write(&self, catalog: &Catalog) -> Result<()> {
        let yaml = serde_yaml::to_string(catalog).map_err(Error::Serialize)?;
        plugin_fs::io::write_atomic(&self.path, yaml.as_bytes())?;
        debug!(catalog = %self.path.display(), entries = catalog.plugins().len(), "saved catalog");
        Ok(())
    }
}
