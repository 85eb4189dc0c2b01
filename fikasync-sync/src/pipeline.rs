//! Phase orchestration used by the CLI.

use std::path::PathBuf;

use fikasync_core::Config;

use crate::backup::BackupManager;
use crate::error::SyncError;
use crate::ignore::IgnoreList;
use crate::remote::RemoteStore;
use crate::session::{PendingUploads, SessionContext};
use crate::shutdown::{ShutdownReconciler, ShutdownReport};
use crate::startup::{StartupReconciler, StartupReport};

/// Local side of a sync: where profiles live, what is ignored and where
/// backups go.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub profiles_dir: PathBuf,
    pub ignore: IgnoreList,
    pub backups: BackupManager,
}

impl Workspace {
    pub fn new(profiles_dir: impl Into<PathBuf>, ignore: IgnoreList, backups: BackupManager) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            ignore,
            backups,
        }
    }

    /// Derive the workspace from `config`, creating `.fikaignore` if needed.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.profiles_dir(),
            IgnoreList::load_or_create_at(&config.ignore_path()),
            BackupManager::new(config.backups_dir(), config.backup_retention),
        )
    }
}

/// Startup phase: fetch the remote tree, merge it locally and capture the
/// session context.
///
/// Fails only when the remote listing cannot be obtained or the profiles
/// directory is unusable. The temporary tree is removed before returning.
pub fn pull<R: RemoteStore>(
    ws: &Workspace,
    remote: &R,
) -> Result<(StartupReport, SessionContext), SyncError> {
    let tree = remote.fetch_tree().map_err(SyncError::Listing)?;
    tracing::debug!(files = tree.files().len(), root = %tree.root().display(), "remote tree fetched");

    let report =
        StartupReconciler::new(&ws.profiles_dir, &ws.ignore, &ws.backups).reconcile(tree.files())?;
    drop(tree);

    let session = SessionContext::capture(&ws.profiles_dir, &ws.ignore, report.pending.clone());
    Ok((report, session))
}

/// Shutdown phase.
pub fn push<R: RemoteStore>(ws: &Workspace, remote: &R, session: &SessionContext) -> ShutdownReport {
    ShutdownReconciler::new(&ws.profiles_dir, &ws.ignore, remote).reconcile(session)
}

/// Session context for a run without a startup merge: nothing pending.
pub fn offline_session(ws: &Workspace) -> SessionContext {
    SessionContext::capture(&ws.profiles_dir, &ws.ignore, PendingUploads::default())
}
