//! Error types for plugin-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from plugin-core
    #[error(transparent)]
    Core(#[from] plugin_core::Error),

    /// Error from plugin-meta
    #[error(transparent)]
    Meta(#[from] plugin_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
