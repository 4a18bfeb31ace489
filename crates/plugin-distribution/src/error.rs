//! Error types for plugin-distribution

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("artifact {artifact} not found in {distribution}")]
    NotFound {
        distribution: String,
        artifact: String,
    },

    #[error("failed to fetch {artifact} from {distribution}: {source}")]
    Transport {
        distribution: String,
        artifact: String,
        #[source]
        source: plugin_transport::Error,
    },

    #[error(transparent)]
    InvalidConfig(#[from] plugin_meta::Error),
}

impl Error {
    pub(crate) fn fetch(distribution: String, artifact: String, source: plugin_transport::Error) -> Self {
        if source.is_not_found() {
            Self::NotFound {
                distribution,
                artifact,
            }
        } else {
            Self::Transport {
                distribution,
                artifact,
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
