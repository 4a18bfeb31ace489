//! Error types for plugin-discovery

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid discovery config '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("plugin '{plugin}' not found in discovery '{discovery}'")]
    NotFound { discovery: String, plugin: String },

    #[error("discovery '{discovery}': manifest not found at {location}")]
    ManifestNotFound { discovery: String, location: String },

    #[error("discovery '{discovery}': failed to read manifest {}: {source}", .path.display())]
    Fs {
        discovery: String,
        path: PathBuf,
        #[source]
        source: plugin_fs::Error,
    },

    #[error("discovery '{discovery}': failed to fetch manifest: {source}")]
    Transport {
        discovery: String,
        #[source]
        source: plugin_transport::Error,
    },

    #[error("discovery '{discovery}': invalid manifest: {source}")]
    Manifest {
        discovery: String,
        #[source]
        source: plugin_meta::Error,
    },
}

impl Error {
    /// Wrap a transport failure, keeping "not found" distinguishable.
    pub(crate) fn transport(discovery: &str, source: plugin_transport::Error) -> Self {
        match source {
            plugin_transport::Error::NotFound { location } => Self::ManifestNotFound {
                discovery: discovery.to_string(),
                location,
            },
            source => Self::Transport {
                discovery: discovery.to_string(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ManifestNotFound { .. })
    }
}
