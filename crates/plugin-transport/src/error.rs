//! Error types for plugin-transport

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend answered, but has no such object or image.
    #[error("not found: {location}")]
    NotFound { location: String },

    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} returned HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("registry request for {reference} failed: {message}")]
    Registry { reference: String, message: String },

    #[error("invalid image reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    #[error("invalid object location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Fs(#[from] plugin_fs::Error),
}

impl Error {
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
