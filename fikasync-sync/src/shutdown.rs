//! Shutdown pass: push progress made during the session.
//!
//! Strictly local to remote. Profiles that changed since the session start
//! are uploaded as-is. Profiles deferred at startup are re-checked against
//! the live remote copy first and skipped as a conflict when the remote
//! moved past them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use fikasync_core::{ProfileName, ProfileState};

use crate::ignore::IgnoreList;
use crate::remote::RemoteStore;
use crate::session::SessionContext;
use crate::snapshot::{extract_marker, profile_files, profile_state};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadReason {
    /// Changed during the session, or new since it started.
    NewProgress,
    /// Deferred at startup and still ahead of the remote.
    PendingSync,
    /// Deferred at startup but the remote is now at least as far along.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadResult {
    Sent,
    Failed(String),
    /// Upload skipped; the remote marker was not behind the local one.
    RemoteNewer { remote_timestamp: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownRow {
    pub file: ProfileName,
    pub reason: UploadReason,
    pub result: UploadResult,
    pub local_timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// One row per profile that needed action, in filename order.
    pub rows: Vec<ShutdownRow>,
    pub uploaded: usize,
    /// Profiles that needed no action.
    pub unchanged: usize,
}

impl ShutdownReport {
    pub fn conflicts(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.reason == UploadReason::Conflict)
            .count()
    }

    pub fn failures(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.result, UploadResult::Failed(_)))
            .count()
    }

    /// No profile needed an upload, a check or reported a failure.
    pub fn is_quiet(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// First-stage decision, made without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownDecision {
    NewProgress,
    VerifyPending,
    NoChange,
}

pub fn classify(
    current: &ProfileState,
    start: Option<&ProfileState>,
    pending: bool,
) -> ShutdownDecision {
    match start {
        None => ShutdownDecision::NewProgress,
        Some(start) if current.hash != start.hash && current.timestamp >= start.timestamp => {
            ShutdownDecision::NewProgress
        }
        _ if pending => ShutdownDecision::VerifyPending,
        _ => ShutdownDecision::NoChange,
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

pub struct ShutdownReconciler<'a, R: RemoteStore> {
    profiles_dir: &'a Path,
    ignore: &'a IgnoreList,
    remote: &'a R,
}

impl<'a, R: RemoteStore> ShutdownReconciler<'a, R> {
    pub fn new(profiles_dir: &'a Path, ignore: &'a IgnoreList, remote: &'a R) -> Self {
        Self {
            profiles_dir,
            ignore,
            remote,
        }
    }

    /// Scan the profiles directory and upload what the session produced.
    ///
    /// Never fails as a whole: upload errors are recorded per row.
    pub fn reconcile(&self, session: &SessionContext) -> ShutdownReport {
        match profile_files(self.profiles_dir, self.ignore) {
            Ok(files) => self.reconcile_files(session, files),
            Err(err) => {
                tracing::error!(error = %err, "profiles directory could not be scanned");
                ShutdownReport::default()
            }
        }
    }

    /// Shutdown pass over an already listed set of profile files.
    ///
    /// A file that cannot be read gets a failed row; it is never counted as
    /// unchanged.
    pub(crate) fn reconcile_files(
        &self,
        session: &SessionContext,
        files: Vec<(ProfileName, PathBuf)>,
    ) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        for (name, path) in files {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(file = %name, error = %err, "profile unreadable");
                    let reason = if session.pending().contains(name.as_str()) {
                        UploadReason::PendingSync
                    } else {
                        UploadReason::NewProgress
                    };
                    report.rows.push(ShutdownRow {
                        file: name.clone(),
                        reason,
                        local_timestamp: session
                            .start()
                            .get(name.as_str())
                            .map_or(0, |state| state.timestamp),
                        result: UploadResult::Failed(format!("profile could not be read: {err}")),
                    });
                    continue;
                }
            };
            let current = profile_state(&bytes);

            let decision = classify(
                &current,
                session.start().get(name.as_str()),
                session.pending().contains(name.as_str()),
            );
            let reason = match decision {
                ShutdownDecision::NoChange => {
                    report.unchanged += 1;
                    continue;
                }
                ShutdownDecision::NewProgress => UploadReason::NewProgress,
                ShutdownDecision::VerifyPending => match self.remote_marker(&name) {
                    Some(remote_ts) if current.timestamp <= remote_ts => {
                        tracing::warn!(
                            file = %name,
                            local_ts = current.timestamp,
                            remote_ts,
                            "remote became newer during the session, upload skipped"
                        );
                        report.rows.push(ShutdownRow {
                            file: name,
                            reason: UploadReason::Conflict,
                            result: UploadResult::RemoteNewer {
                                remote_timestamp: remote_ts,
                            },
                            local_timestamp: current.timestamp,
                        });
                        continue;
                    }
                    _ => UploadReason::PendingSync,
                },
            };

            let result = self.upload(&name, &bytes);
            if result == UploadResult::Sent {
                report.uploaded += 1;
            }
            report.rows.push(ShutdownRow {
                file: name,
                reason,
                result,
                local_timestamp: current.timestamp,
            });
        }

        tracing::info!(
            uploaded = report.uploaded,
            unchanged = report.unchanged,
            conflicts = report.conflicts(),
            "shutdown sync finished"
        );
        report
    }

    /// Marker of the live remote copy; `None` when it is missing or could
    /// not be fetched.
    fn remote_marker(&self, name: &ProfileName) -> Option<i64> {
        match self.remote.read_file(&name.remote_path()) {
            Ok(Some(bytes)) => {
                let ts = extract_marker(&bytes);
                tracing::debug!(file = %name, remote_ts = ts, "verified remote copy");
                Some(ts)
            }
            Ok(None) => {
                tracing::debug!(file = %name, "no remote copy");
                None
            }
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "remote copy could not be verified, treating as absent");
                None
            }
        }
    }

    fn upload(&self, name: &ProfileName, bytes: &[u8]) -> UploadResult {
        match self.remote.write_file(&name.remote_path(), bytes) {
            Ok(()) => {
                tracing::info!(file = %name, "profile uploaded");
                UploadResult::Sent
            }
            Err(err) => {
                tracing::error!(file = %name, error = %err, "upload failed");
                UploadResult::Failed(err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteError, RemoteTree};
    use crate::session::PendingUploads;
    use crate::snapshot::build_snapshot;
    use crate::test_support::profile_json;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeRemote {
        files: RefCell<BTreeMap<String, Vec<u8>>>,
        writes: RefCell<Vec<String>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl RemoteStore for FakeRemote {
        fn fetch_tree(&self) -> Result<RemoteTree, RemoteError> {
            Err(RemoteError::Transport("not used".into()))
        }

        fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, RemoteError> {
            if self.fail_reads {
                return Err(RemoteError::Transport("offline".into()));
            }
            Ok(self.files.borrow().get(path).cloned())
        }

        fn write_file(&self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
            self.writes.borrow_mut().push(path.to_string());
            if self.fail_writes {
                return Err(RemoteError::Http {
                    status: 500,
                    url: path.to_string(),
                });
            }
            self.files
                .borrow_mut()
                .insert(path.to_string(), content.to_vec());
            Ok(())
        }
    }

    fn pending(names: &[&str]) -> PendingUploads {
        names.iter().map(|n| ProfileName::from(*n)).collect()
    }

    #[rstest]
    #[case(("a", 5), None, false, ShutdownDecision::NewProgress)]
    #[case(("b", 9), Some(("a", 4)), false, ShutdownDecision::NewProgress)]
    #[case(("b", 4), Some(("a", 4)), false, ShutdownDecision::NewProgress)]
    #[case(("b", 3), Some(("a", 4)), false, ShutdownDecision::NoChange)]
    #[case(("b", 3), Some(("a", 4)), true, ShutdownDecision::VerifyPending)]
    #[case(("a", 4), Some(("a", 4)), true, ShutdownDecision::VerifyPending)]
    #[case(("a", 4), Some(("a", 4)), false, ShutdownDecision::NoChange)]
    fn classify_cases(
        #[case] current: (&str, i64),
        #[case] start: Option<(&str, i64)>,
        #[case] is_pending: bool,
        #[case] expected: ShutdownDecision,
    ) {
        let current = ProfileState::new(current.0, current.1);
        let start = start.map(|(h, t)| ProfileState::new(h, t));
        assert_eq!(classify(&current, start.as_ref(), is_pending), expected);
    }

    #[test]
    fn unchanged_profiles_produce_no_rows() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), profile_json(1)).unwrap();
        let ignore = IgnoreList::default();
        let session =
            SessionContext::new(build_snapshot(dir.path(), &ignore), PendingUploads::default());
        let remote = FakeRemote::default();

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile(&session);

        assert!(report.rows.is_empty());
        assert_eq!(report.unchanged, 1);
        assert!(report.is_quiet());
        assert!(remote.writes.borrow().is_empty());
    }

    #[test]
    fn pending_profile_conflicts_when_remote_advanced() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("p.json"), profile_json(5)).unwrap();
        let ignore = IgnoreList::default();
        let session = SessionContext::new(build_snapshot(dir.path(), &ignore), pending(&["p.json"]));
        let remote = FakeRemote::default();
        remote
            .files
            .borrow_mut()
            .insert("profiles/p.json".into(), profile_json(10).into_bytes());

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile(&session);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].reason, UploadReason::Conflict);
        assert_eq!(
            report.rows[0].result,
            UploadResult::RemoteNewer {
                remote_timestamp: 10
            }
        );
        assert!(remote.writes.borrow().is_empty());
        assert_eq!(report.conflicts(), 1);
    }

    #[test]
    fn equal_remote_marker_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("p.json"), profile_json(5)).unwrap();
        let ignore = IgnoreList::default();
        let session = SessionContext::new(build_snapshot(dir.path(), &ignore), pending(&["p.json"]));
        let remote = FakeRemote::default();
        remote
            .files
            .borrow_mut()
            .insert("profiles/p.json".into(), profile_json(5).into_bytes());

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile(&session);

        assert_eq!(report.rows[0].reason, UploadReason::Conflict);
        assert_eq!(report.uploaded, 0);
    }

    #[test]
    fn verification_failure_counts_as_absent_remote() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("p.json"), profile_json(5)).unwrap();
        let ignore = IgnoreList::default();
        let session = SessionContext::new(build_snapshot(dir.path(), &ignore), pending(&["p.json"]));
        let remote = FakeRemote {
            fail_reads: true,
            ..Default::default()
        };

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile(&session);

        assert_eq!(report.rows[0].reason, UploadReason::PendingSync);
        assert_eq!(report.rows[0].result, UploadResult::Sent);
        assert_eq!(*remote.writes.borrow(), vec!["profiles/p.json".to_string()]);
    }

    #[test]
    fn unreadable_profile_is_a_failed_row() {
        let dir = TempDir::new().unwrap();
        let ignore = IgnoreList::default();
        std::fs::write(dir.path().join("a.json"), profile_json(5)).unwrap();
        let session =
            SessionContext::new(build_snapshot(dir.path(), &ignore), PendingUploads::default());
        std::fs::remove_file(dir.path().join("a.json")).unwrap();
        let remote = FakeRemote::default();

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile_files(
            &session,
            vec![(ProfileName::from("a.json"), dir.path().join("a.json"))],
        );

        assert_eq!(report.unchanged, 0);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].reason, UploadReason::NewProgress);
        assert_eq!(report.rows[0].local_timestamp, 5);
        assert!(matches!(report.rows[0].result, UploadResult::Failed(_)));
        assert_eq!(report.failures(), 1);
        assert!(!report.is_quiet());
        assert!(remote.writes.borrow().is_empty());
    }

    #[test]
    fn unreadable_pending_profile_keeps_its_reason() {
        let dir = TempDir::new().unwrap();
        let ignore = IgnoreList::default();
        let session = SessionContext::new(Default::default(), pending(&["b.json"]));
        let remote = FakeRemote::default();

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile_files(
            &session,
            vec![(ProfileName::from("b.json"), dir.path().join("b.json"))],
        );

        assert_eq!(report.rows[0].reason, UploadReason::PendingSync);
        assert!(matches!(report.rows[0].result, UploadResult::Failed(_)));
    }

    #[test]
    fn write_failure_is_per_file() {
        let dir = TempDir::new().unwrap();
        let ignore = IgnoreList::default();
        let session = SessionContext::default();
        std::fs::write(dir.path().join("a.json"), profile_json(1)).unwrap();
        std::fs::write(dir.path().join("b.json"), profile_json(2)).unwrap();
        let remote = FakeRemote {
            fail_writes: true,
            ..Default::default()
        };

        let report = ShutdownReconciler::new(dir.path(), &ignore, &remote).reconcile(&session);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.failures(), 2);
        assert_eq!(report.uploaded, 0);
        assert_eq!(remote.writes.borrow().len(), 2);
    }
}
