//! Error types for fikasync-remote.

use std::path::PathBuf;

use thiserror::Error;

use fikasync_sync::RemoteError;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`GitHubError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitHubError {
    GitHubError::Io {
        path: path.into(),
        source,
    }
}

impl From<GitHubError> for RemoteError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http { status, url } => RemoteError::Http { status, url },
            GitHubError::Transport(msg) => RemoteError::Transport(msg),
            GitHubError::Url(e) => RemoteError::Transport(e.to_string()),
            GitHubError::Archive(e) => RemoteError::Archive(e.to_string()),
            GitHubError::Decode(msg) => RemoteError::Decode(msg),
            GitHubError::Io { path, source } => RemoteError::Io { path, source },
        }
    }
}
