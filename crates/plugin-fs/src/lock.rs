//! Cross-process advisory file lock with a bounded acquisition timeout.
//!
//! The lock lives in a sidecar file next to the guarded resource. Acquisition
//! polls `try_lock_exclusive` with exponential backoff until the timeout
//! elapses; the lock is released when the guard is dropped, on every exit
//! path.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, Result};

/// Exclusive advisory lock held for the lifetime of the value.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if another holder keeps the lock for
    /// longer than `timeout`, or [`Error::Io`] if the lock file cannot be
    /// opened or the platform rejects the lock for another reason.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io(path, e))?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(10))
            .with_max_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(timeout))
            .build();

        let contended = fs2::lock_contended_error().raw_os_error();
        let attempt = backoff::retry(policy, || match file.try_lock_exclusive() {
            Ok(()) => Ok(()),
            Err(e) if e.raw_os_error() == contended => Err(backoff::Error::transient(e)),
            Err(e) => Err(backoff::Error::permanent(e)),
        });

        match attempt {
            Ok(()) => {
                tracing::trace!(lock = %path.display(), "lock acquired");
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(backoff::Error::Transient { .. }) => Err(Error::LockTimeout {
                path: path.to_path_buf(),
                timeout,
            }),
            Err(backoff::Error::Permanent(e)) => Err(Error::io(path, e)),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

/// Sidecar lock path for a guarded file: `<file>.lock`.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_path_appends_suffix() {
        let p = lock_path_for(Path::new("/tmp/cache/catalog.yaml"));
        assert_eq!(p, PathBuf::from("/tmp/cache/catalog.yaml.lock"));
    }

    #[test]
    fn lock_can_be_reacquired_after_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");

        let first = FileLock::acquire(&path, Duration::from_millis(100)).unwrap();
        drop(first);
        let second = FileLock::acquire(&path, Duration::from_millis(100)).unwrap();
        assert_eq!(second.path(), path.as_path());
    }

    #[test]
    fn held_lock_times_out_second_acquirer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");

        let _held = FileLock::acquire(&path, Duration::from_millis(100)).unwrap();
        let err = FileLock::acquire(&path, Duration::from_millis(150)).unwrap_err();

        assert!(
            matches!(err, Error::LockTimeout { .. }),
            "expected LockTimeout, got: {err:?}"
        );
    }
}
