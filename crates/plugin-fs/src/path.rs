//! Validation of path segments derived from untrusted metadata.
//!
//! Plugin names, versions and distribution-provided installation paths all
//! end up as directories under the plugin root. They must stay relative and
//! must never climb out of it.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Validate a single path segment such as a plugin name or version.
///
/// Accepts ASCII alphanumerics plus `-`, `_`, `.` and `+`; rejects empty
/// values, `.`/`..` and anything containing a separator.
pub fn validate_path_identifier(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::unsafe_path(value, "must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(Error::unsafe_path(value, "must not be a relative directory marker"));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')))
    {
        return Err(Error::unsafe_path(
            value,
            format!("contains disallowed character {bad:?}"),
        ));
    }
    Ok(())
}

/// Convert a `/`-separated relative path into a native [`PathBuf`].
///
/// Empty segments (from leading, trailing or doubled slashes) are ignored.
/// Absolute paths, drive prefixes and `..` components are rejected.
pub fn relative_path(value: &str) -> Result<PathBuf> {
    if Path::new(value).is_absolute() || value.starts_with('/') || value.starts_with('\\') {
        return Err(Error::unsafe_path(value, "must be relative"));
    }

    let mut out = PathBuf::new();
    for segment in value.split(['/', '\\']).filter(|s| !s.is_empty()) {
        match Path::new(segment).components().next() {
            Some(Component::Normal(_)) => {}
            Some(Component::CurDir) => continue,
            _ => return Err(Error::unsafe_path(value, "must not escape its root")),
        }
        validate_path_identifier(segment)?;
        out.push(segment);
    }
    Ok(out)
}
