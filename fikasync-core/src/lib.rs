//! FikaSync core library: domain types, configuration and errors.
//!
//! Public API surface:
//! - [`types`]: profile names, per-file state, snapshots, repository refs
//! - [`config`]: `.env` backed configuration and derived paths
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{ProfileName, ProfileState, RepoRef, Snapshot};
