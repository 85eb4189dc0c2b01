//! Remote store seam.
//!
//! The reconcilers only see this trait. The GitHub transport lives in
//! `fikasync-remote`; tests use an in-memory fake.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

/// Failure of a single remote operation.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Remote profiles materialized on local disk.
///
/// Owns the temporary directory the files live in; dropping the tree
/// deletes it.
#[derive(Debug)]
pub struct RemoteTree {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl RemoteTree {
    pub fn new(dir: TempDir, files: Vec<PathBuf>) -> Self {
        Self { dir, files }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Extracted profile paths, in listing order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Read/write access to the repository holding the profiles.
///
/// Paths are repository-relative, e.g. `profiles/alice.json`.
pub trait RemoteStore {
    /// Download the current tree and return the `*.json` files found in it.
    fn fetch_tree(&self) -> Result<RemoteTree, RemoteError>;

    /// Current content of one file, `None` if it does not exist.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, RemoteError>;

    /// Create or update one file.
    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), RemoteError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn fetch_tree(&self) -> Result<RemoteTree, RemoteError> {
        (**self).fetch_tree()
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        (**self).write_file(path, content)
    }
}
