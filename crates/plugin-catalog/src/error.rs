//! Error types for plugin-catalog

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Fs(#[from] plugin_fs::Error),
}

impl Error {
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::Fs(plugin_fs::Error::LockTimeout { .. }))
    }
}
