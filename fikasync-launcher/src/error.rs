//! Error types for fikasync-launcher.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("server executable not found: {path}")]
    ServerNotFound { path: PathBuf },

    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped before the session began.
    #[error("server exited unexpectedly (exit code {})", exit_code(.code))]
    ServerExited { code: Option<i32> },

    #[error("failed to query server process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("invalid config pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
