//! Atomic I/O operations
//!
//! All writes go through a temporary file in the destination directory
//! followed by a rename, so readers never observe partially written content.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Creates the parent directory if it does not exist.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_with_mode(path, content, None)
}

/// Write content atomically and mark the result executable (`0o755` on Unix).
///
/// Concurrent writers of identical content to the same path are safe: each
/// uses its own temporary file and the last rename wins.
pub fn write_executable(path: &Path, content: &[u8]) -> Result<()> {
    write_with_mode(path, content, Some(0o755))
}

fn write_with_mode(path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_temp(&temp_path, content, mode)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Temp file in the same directory (ensures same filesystem for the rename).
fn temp_path_for(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        uuid::Uuid::new_v4().simple()
    );
    path.with_file_name(temp_name)
}

fn write_temp(temp_path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    drop(temp_file);

    if let Some(mode) = mode {
        set_mode(temp_path, mode)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Read a file, returning `None` if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Remove a file. Returns `false` if it was already absent.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Recursively remove a directory. Returns `false` if it was already absent.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}
