//! # fikasync-launcher
//!
//! Supervision of the local SPT server and launcher for one play session.
//!
//! [`GameLauncher::launch`] starts the server, waits for its HTTP port,
//! opens the launcher, blocks until the user ends the session and then
//! stops the server. The port comes from the server's own config files,
//! see [`detect_endpoint`].

pub mod endpoint;
pub mod error;
pub mod launcher;

pub use endpoint::{detect_endpoint, port_open, Endpoint};
pub use error::LaunchError;
pub use launcher::{GameLauncher, SessionOutcome};
