//! Error types for fikasync-sync.

use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors that abort a whole sync phase.
///
/// Per-file failures never surface here; they are recorded on the report
/// row of the affected file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote profile list could not be obtained.
    #[error("failed to fetch remote profiles: {0}")]
    Listing(#[source] RemoteError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
