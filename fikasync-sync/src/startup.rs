//! Startup merge: bring remote progress down before the game starts.
//!
//! For every remote profile the local copy is either left alone (synced),
//! marked for a deferred upload (local newer) or replaced by the remote
//! copy after a backup. Profiles that exist only locally are queued for
//! upload. No network calls happen here; the remote tree has already been
//! materialized on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use serde::Serialize;

use fikasync_core::{ProfileName, ProfileState};

use crate::backup::BackupManager;
use crate::error::{io_err, SyncError};
use crate::ignore::IgnoreList;
use crate::session::PendingUploads;
use crate::snapshot::{profile_files, profile_state, read_state_or_default};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Classification of one profile during the startup merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupStatus {
    /// Hash or progress marker equal on both sides.
    Synced,
    /// Local marker is ahead; upload deferred to shutdown.
    LocalNewer,
    /// Remote copy applied locally.
    Update,
    /// Profile exists only locally.
    NewLocal,
}

/// What the merge did about one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupAction {
    None,
    WillUpload,
    Downloaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupRow {
    pub file: ProfileName,
    pub status: StartupStatus,
    pub action: StartupAction,
    pub local: ProfileState,
    /// `None` for [`StartupStatus::NewLocal`] rows and unreadable remote files.
    pub remote: Option<ProfileState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Remote listing order, then new local profiles by name.
    pub rows: Vec<StartupRow>,
    pub updated: usize,
    pub failed: usize,
    pub pending: PendingUploads,
}

impl StartupReport {
    pub fn rows_with(&self, status: StartupStatus) -> impl Iterator<Item = &StartupRow> {
        self.rows.iter().filter(move |row| row.status == status)
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Startup decision for a profile present remotely.
///
/// Equality of either the hash or the marker counts as synced, even though
/// that can hide a same-marker content edit.
pub fn classify(local: &ProfileState, remote: &ProfileState) -> StartupStatus {
    if local.hash == remote.hash || local.timestamp == remote.timestamp {
        StartupStatus::Synced
    } else if local.timestamp > remote.timestamp {
        StartupStatus::LocalNewer
    } else {
        StartupStatus::Update
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct StartupReconciler<'a> {
    profiles_dir: &'a Path,
    ignore: &'a IgnoreList,
    backups: &'a BackupManager,
}

impl<'a> StartupReconciler<'a> {
    pub fn new(profiles_dir: &'a Path, ignore: &'a IgnoreList, backups: &'a BackupManager) -> Self {
        Self {
            profiles_dir,
            ignore,
            backups,
        }
    }

    /// Merge `remote_files` into the profiles directory.
    ///
    /// Only a profiles directory that cannot be created or listed fails the
    /// whole pass; every per-file problem ends up on that file's row.
    pub fn reconcile(&self, remote_files: &[PathBuf]) -> Result<StartupReport, SyncError> {
        std::fs::create_dir_all(self.profiles_dir).map_err(|e| io_err(self.profiles_dir, e))?;

        let mut report = StartupReport::default();
        let mut processed: BTreeSet<ProfileName> = BTreeSet::new();
        let mut pending: Vec<ProfileName> = Vec::new();

        for remote_path in remote_files {
            let Some(name) = remote_path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %remote_path.display(), "skipping remote file without a usable name");
                continue;
            };
            if self.ignore.is_ignored(name) {
                tracing::debug!(file = %name, "ignored");
                continue;
            }
            let name = ProfileName::from(name);
            if !processed.insert(name.clone()) {
                tracing::debug!(file = %name, "duplicate remote profile skipped");
                continue;
            }

            let row = self.reconcile_remote(name, remote_path);
            match &row.action {
                StartupAction::Downloaded => report.updated += 1,
                StartupAction::WillUpload => pending.push(row.file.clone()),
                StartupAction::Failed(_) => report.failed += 1,
                StartupAction::None => {}
            }
            report.rows.push(row);
        }

        for (name, path) in profile_files(self.profiles_dir, self.ignore)? {
            if processed.contains(&name) {
                continue;
            }
            tracing::debug!(file = %name, "local-only profile queued for upload");
            pending.push(name.clone());
            report.rows.push(StartupRow {
                file: name,
                status: StartupStatus::NewLocal,
                action: StartupAction::WillUpload,
                local: read_state_or_default(&path),
                remote: None,
            });
        }

        report.pending = pending.into_iter().collect();
        tracing::info!(
            profiles = report.rows.len(),
            updated = report.updated,
            pending = report.pending.len(),
            failed = report.failed,
            "startup merge finished"
        );
        Ok(report)
    }

    fn reconcile_remote(&self, name: ProfileName, remote_path: &Path) -> StartupRow {
        let local_path = self.profiles_dir.join(name.as_str());
        let local_exists = local_path.is_file();
        let local = if local_exists {
            read_state_or_default(&local_path)
        } else {
            ProfileState::absent()
        };

        let bytes = match std::fs::read(remote_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "remote copy unreadable");
                return StartupRow {
                    file: name,
                    status: StartupStatus::Update,
                    action: StartupAction::Failed(err.to_string()),
                    local,
                    remote: None,
                };
            }
        };
        let remote = profile_state(&bytes);

        let status = classify(&local, &remote);
        tracing::debug!(
            file = %name,
            local_ts = local.timestamp,
            remote_ts = remote.timestamp,
            ?status,
            "compared"
        );

        let action = match status {
            StartupStatus::Synced => StartupAction::None,
            StartupStatus::LocalNewer | StartupStatus::NewLocal => StartupAction::WillUpload,
            StartupStatus::Update => {
                match self.apply_update(remote_path, &local_path, local_exists) {
                    Ok(()) => {
                        tracing::info!(file = %name, timestamp = remote.timestamp, "profile updated from remote");
                        StartupAction::Downloaded
                    }
                    Err(err) => {
                        tracing::error!(file = %name, error = %err, "profile update failed");
                        StartupAction::Failed(err.to_string())
                    }
                }
            }
        };

        StartupRow {
            file: name,
            status,
            action,
            local,
            remote: Some(remote),
        }
    }

    /// Back up the local copy (best effort), replace it with `src` through
    /// a sibling temp file, then carry over the source mtime.
    fn apply_update(&self, src: &Path, dest: &Path, had_local: bool) -> Result<(), SyncError> {
        if had_local {
            if let Err(err) = self.backups.backup(dest) {
                tracing::warn!(path = %dest.display(), error = %err, "backup failed, updating anyway");
            }
        }

        let tmp = PathBuf::from(format!("{}.fikasync.tmp", dest.display()));
        std::fs::copy(src, &tmp).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, dest) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(dest, e));
        }

        match std::fs::metadata(src) {
            Ok(meta) => {
                let mtime = FileTime::from_last_modification_time(&meta);
                if let Err(err) = filetime::set_file_mtime(dest, mtime) {
                    tracing::warn!(path = %dest.display(), error = %err, "could not set modification time");
                }
            }
            Err(err) => {
                tracing::warn!(path = %src.display(), error = %err, "could not read remote modification time")
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
