//! Error types for plugin-core

use std::fmt;
use std::path::PathBuf;

/// Result type for plugin-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of every failure the manager can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lookup miss in discovery, distribution or the catalog
    NotFound,
    /// Aggregated rule violations in descriptors, manifests or ranges
    Validation,
    /// Requested version outside the supported ranges
    VersionConstraint,
    /// Network or storage failure while fetching
    Transport,
    /// Catalog lock could not be acquired in time
    LockTimeout,
    Config,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::Validation => "validation",
            Self::VersionConstraint => "version constraint",
            Self::Transport => "transport",
            Self::LockTimeout => "lock timeout",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(s)
    }
}

/// Errors that can occur in plugin-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("plugin '{name}' not found in any discovery source")]
    PluginNotFound { name: String },

    #[error("plugin '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("plugin '{name}' is not published for {platform}")]
    UnsupportedPlatform { name: String, platform: String },

    #[error("unable to list plugins from discovery '{name}': {source}")]
    Discovery {
        name: String,
        #[source]
        source: plugin_discovery::Error,
    },

    #[error("unable to fetch plugin '{name}' {version}: {source}")]
    Distribution {
        name: String,
        version: String,
        #[source]
        source: plugin_distribution::Error,
    },

    #[error("could not describe plugin binary {}: {reason}", .binary.display())]
    Describe { binary: PathBuf, reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Meta(#[from] plugin_meta::Error),

    #[error(transparent)]
    Catalog(#[from] plugin_catalog::Error),

    #[error(transparent)]
    Transport(#[from] plugin_transport::Error),

    #[error(transparent)]
    Fs(#[from] plugin_fs::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PluginNotFound { .. }
            | Self::NotInstalled { .. }
            | Self::UnsupportedPlatform { .. } => ErrorKind::NotFound,
            Self::Discovery { source, .. } => discovery_kind(source),
            Self::Distribution { source, .. } => match source {
                plugin_distribution::Error::NotFound { .. } => ErrorKind::NotFound,
                plugin_distribution::Error::Transport { .. } => ErrorKind::Transport,
                plugin_distribution::Error::InvalidConfig(e) => meta_kind(e),
            },
            Self::Describe { .. } => ErrorKind::Validation,
            Self::Config { .. } => ErrorKind::Config,
            Self::Meta(e) => meta_kind(e),
            Self::Catalog(e) => match e {
                plugin_catalog::Error::Fs(e) => fs_kind(e),
                _ => ErrorKind::Io,
            },
            Self::Transport(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Fs(e) => fs_kind(e),
        }
    }
}

fn discovery_kind(e: &plugin_discovery::Error) -> ErrorKind {
    use plugin_discovery::Error as D;
    match e {
        D::NotFound { .. } | D::ManifestNotFound { .. } => ErrorKind::NotFound,
        D::InvalidConfig { .. } => ErrorKind::Config,
        D::Transport { .. } => ErrorKind::Transport,
        D::Manifest { source, .. } => meta_kind(source),
        D::Fs { source, .. } => fs_kind(source),
    }
}

fn meta_kind(e: &plugin_meta::Error) -> ErrorKind {
    use plugin_meta::Error as M;
    match e {
        M::VersionConstraint { .. } | M::NoRecommendedVersion => ErrorKind::VersionConstraint,
        M::Validation(_) | M::InvalidRange { .. } | M::ManifestParse(_) | M::DescriptorParse(_) => {
            ErrorKind::Validation
        }
        M::InvalidDistribution { .. } => ErrorKind::Config,
        M::Fs(e) => fs_kind(e),
    }
}

fn fs_kind(e: &plugin_fs::Error) -> ErrorKind {
    use plugin_fs::Error as F;
    match e {
        F::LockTimeout { .. } => ErrorKind::LockTimeout,
        F::UnsafePath { .. } => ErrorKind::Validation,
        F::ConfigParse { .. } | F::ConfigSerialize { .. } | F::UnsupportedFormat { .. } => {
            ErrorKind::Config
        }
        _ => ErrorKind::Io,
    }
}
