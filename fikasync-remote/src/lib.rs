//! # fikasync-remote
//!
//! GitHub REST transport for profile sync.
//!
//! [`GitHubClient`] implements [`fikasync_sync::RemoteStore`] on top of a
//! blocking `ureq` agent: the repository zipball is extracted into a
//! temporary directory for the startup merge, single files are read raw for
//! conflict checks, and uploads go through the contents API.

pub mod archive;
pub mod client;
pub mod error;

pub use client::{GitHubClient, ReleaseInfo};
pub use error::GitHubError;
