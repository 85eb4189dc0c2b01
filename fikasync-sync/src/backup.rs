//! Timestamped profile backups with per-profile retention.
//!
//! Layout: `<root>/<file>/<YYYY-MM-DD_HH-MM-SS>/<file>`. After each backup
//! only the newest `retention` timestamp directories of that profile are
//! kept. Directories whose names do not parse as a timestamp are never
//! touched.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{io_err, SyncError};

/// `chrono` format of backup directory names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// One retained backup copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub taken_at: NaiveDateTime,
    /// Path of the copied profile inside the timestamp directory.
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
    retention: usize,
}

impl BackupManager {
    /// `retention` is clamped to at least 1.
    pub fn new(root: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            root: root.into(),
            retention: retention.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copy `path` into a new backup directory stamped with local time.
    pub fn backup(&self, path: &Path) -> Result<PathBuf, SyncError> {
        self.backup_at(path, Local::now().naive_local())
    }

    /// Copy `path` into the backup directory for `now`, then prune.
    ///
    /// Returns the path of the copy. A pruning failure is logged and does
    /// not fail the backup.
    pub fn backup_at(&self, path: &Path, now: NaiveDateTime) -> Result<PathBuf, SyncError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io_err(path, io::Error::new(ErrorKind::InvalidInput, "no file name")))?;

        let dir = self
            .root
            .join(name)
            .join(now.format(TIMESTAMP_FORMAT).to_string());
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

        let dest = dir.join(name);
        std::fs::copy(path, &dest).map_err(|e| io_err(&dest, e))?;
        tracing::info!(file = %name, dest = %dest.display(), "backup created");

        if let Err(err) = self.prune(name) {
            tracing::warn!(file = %name, error = %err, "old backups could not be removed");
        }
        Ok(dest)
    }

    /// Delete all but the newest `retention` backups of `name`.
    ///
    /// Returns the number of directories removed.
    pub fn prune(&self, name: &str) -> Result<usize, SyncError> {
        let stale: Vec<PathBuf> = self
            .timestamp_dirs(name)?
            .into_iter()
            .skip(self.retention)
            .map(|(_, dir)| dir)
            .collect();

        Ok(remove_dirs(&stale))
    }

    /// Retained backups of `name`, newest first.
    pub fn list(&self, name: &str) -> Result<Vec<BackupEntry>, SyncError> {
        Ok(self
            .timestamp_dirs(name)?
            .into_iter()
            .map(|(taken_at, dir)| BackupEntry {
                taken_at,
                path: dir.join(name),
            })
            .collect())
    }

    /// Profile names that have a backup directory, sorted.
    pub fn profiles(&self) -> Result<Vec<String>, SyncError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_err(&self.root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Timestamp directories of `name` sorted newest first.
    fn timestamp_dirs(&self, name: &str) -> Result<Vec<(NaiveDateTime, PathBuf)>, SyncError> {
        let profile_root = self.root.join(name);
        let entries = match std::fs::read_dir(&profile_root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_err(&profile_root, err)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&profile_root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let parsed = entry
                .file_name()
                .to_str()
                .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok());
            if let Some(taken_at) = parsed {
                dirs.push((taken_at, path));
            }
        }
        dirs.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(dirs)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

/// Remove each directory, logging failures and moving on. Returns how many
/// were removed.
fn remove_dirs(dirs: &[PathBuf]) -> usize {
    let mut removed = 0;
    for dir in dirs {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "old backup removed");
                removed += 1;
            }
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "old backup could not be removed");
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::fs;
    use tempfile::TempDir;

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn setup() -> (TempDir, PathBuf, BackupManager) {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join("alice.json");
        fs::write(&profile, "{}").unwrap();
        let manager = BackupManager::new(dir.path().join("backups"), 5);
        (dir, profile, manager)
    }

    #[test]
    fn backup_lands_in_timestamped_directory() {
        let (dir, profile, manager) = setup();

        let dest = manager.backup_at(&profile, base_time()).unwrap();

        assert_eq!(
            dest,
            dir.path()
                .join("backups/alice.json/2024-03-01_12-00-00/alice.json")
        );
        assert_eq!(fs::read_to_string(dest).unwrap(), "{}");
    }

    #[test]
    fn seven_backups_keep_the_five_newest() {
        let (_dir, profile, manager) = setup();

        for i in 0..7 {
            fs::write(&profile, format!("v{i}")).unwrap();
            manager
                .backup_at(&profile, base_time() + Duration::seconds(i))
                .unwrap();
        }

        let entries = manager.list("alice.json").unwrap();
        assert_eq!(entries.len(), 5);
        let expected: Vec<NaiveDateTime> = (2..7)
            .rev()
            .map(|i| base_time() + Duration::seconds(i))
            .collect();
        let got: Vec<NaiveDateTime> = entries.iter().map(|e| e.taken_at).collect();
        assert_eq!(got, expected);
        assert_eq!(fs::read_to_string(&entries[0].path).unwrap(), "v6");
    }

    #[test]
    fn foreign_directories_survive_pruning() {
        let (dir, profile, manager) = setup();
        let foreign = dir.path().join("backups/alice.json/keep-me");
        fs::create_dir_all(&foreign).unwrap();

        for i in 0..6 {
            manager
                .backup_at(&profile, base_time() + Duration::minutes(i))
                .unwrap();
        }

        assert!(foreign.exists());
        assert_eq!(manager.list("alice.json").unwrap().len(), 5);
    }

    #[test]
    fn retention_is_configurable() {
        let (dir, profile, _) = setup();
        let manager = BackupManager::new(dir.path().join("b"), 2);
        for i in 0..4 {
            manager
                .backup_at(&profile, base_time() + Duration::hours(i))
                .unwrap();
        }
        assert_eq!(manager.list("alice.json").unwrap().len(), 2);
        assert_eq!(BackupManager::new("x", 0).retention(), 1);
    }

    #[test]
    fn same_second_backups_share_a_directory() {
        let (_dir, profile, manager) = setup();
        manager.backup_at(&profile, base_time()).unwrap();
        fs::write(&profile, "later").unwrap();
        let dest = manager.backup_at(&profile, base_time()).unwrap();

        assert_eq!(manager.list("alice.json").unwrap().len(), 1);
        assert_eq!(fs::read_to_string(dest).unwrap(), "later");
    }

    #[test]
    fn missing_source_is_an_error() {
        let (dir, _, manager) = setup();
        let err = manager
            .backup_at(&dir.path().join("ghost.json"), base_time())
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn failed_removal_does_not_stop_pruning() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let present = tmp.path().join("20240101_000000");
        std::fs::create_dir_all(&present).unwrap();
        std::fs::write(present.join("a.json"), "{}").unwrap();

        let removed = remove_dirs(&[missing, present.clone()]);

        assert_eq!(removed, 1);
        assert!(!present.exists());
    }

    #[test]
    fn profiles_and_list_on_empty_root() {
        let (_dir, profile, manager) = setup();
        assert!(manager.profiles().unwrap().is_empty());
        assert!(manager.list("alice.json").unwrap().is_empty());

        manager.backup_at(&profile, base_time()).unwrap();
        assert_eq!(manager.profiles().unwrap(), vec!["alice.json".to_string()]);
    }
}
