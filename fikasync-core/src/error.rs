//! Error types for fikasync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration loading and saving.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `.env` file exists but could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Env {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// A required key is absent from both the environment and `.env`.
    #[error("{0} is not configured; run `fikasync init`")]
    MissingKey(&'static str),

    /// `REPO_URL` is not a `https://github.com/<owner>/<repo>` URL.
    #[error("invalid repository URL '{0}'; expected https://github.com/<owner>/<repo>")]
    InvalidRepoUrl(String),

    /// A key holds a value of the wrong shape.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
