//! # fikasync-sync
//!
//! Profile reconciliation between the local SPT profiles directory and the
//! remote repository.
//!
//! A run has two phases. [`pipeline::pull`] fetches the remote tree, applies
//! remote updates locally and returns a [`SessionContext`] (session-start
//! snapshot plus pending uploads). After the play session,
//! [`pipeline::push`] re-scans the profiles and uploads what changed or was
//! deferred, verifying deferred files against the remote first.

pub mod backup;
pub mod error;
pub mod ignore;
pub mod pipeline;
pub mod remote;
pub mod session;
pub mod shutdown;
pub mod snapshot;
pub mod startup;

pub use backup::{BackupEntry, BackupManager};
pub use error::SyncError;
pub use ignore::IgnoreList;
pub use pipeline::{offline_session, pull, push, Workspace};
pub use remote::{RemoteError, RemoteStore, RemoteTree};
pub use session::{PendingUploads, SessionContext};
pub use shutdown::{
    ShutdownDecision, ShutdownReconciler, ShutdownReport, ShutdownRow, UploadReason,
    UploadResult,
};
pub use startup::{StartupAction, StartupReconciler, StartupReport, StartupRow, StartupStatus};
