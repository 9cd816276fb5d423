//! Error types for colsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building an [`Artifact`](crate::Artifact).
///
/// These are input contract violations; a sync refuses to start on them.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The document carries no usable name.
    #[error("artifact has no name (expected a non-empty `info.name`)")]
    MissingName,

    /// The collection file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The collection file is not valid JSON.
    #[error("failed to parse collection at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while loading [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path for context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The credential variable is unset or empty.
    #[error("API key not found; set ${var}")]
    MissingApiKey { var: String },
}

/// Convenience constructor for [`ArtifactError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.into(),
        source,
    }
}
