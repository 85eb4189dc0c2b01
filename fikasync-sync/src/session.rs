//! State handed from the startup phase to the shutdown phase.

use std::collections::BTreeSet;
use std::path::Path;

use fikasync_core::{ProfileName, Snapshot};

use crate::{ignore::IgnoreList, snapshot::build_snapshot};

/// Profiles that were ahead of the remote at startup and still need a
/// safety check before upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingUploads(BTreeSet<ProfileName>);

impl PendingUploads {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileName> {
        self.0.iter()
    }
}

impl FromIterator<ProfileName> for PendingUploads {
    fn from_iter<I: IntoIterator<Item = ProfileName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Immutable result of the startup phase: what the profiles looked like
/// when the game started, plus the deferred uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    start: Snapshot,
    pending: PendingUploads,
}

impl SessionContext {
    pub fn new(start: Snapshot, pending: PendingUploads) -> Self {
        Self { start, pending }
    }

    /// Scan `profiles_dir` now and pair it with `pending`.
    pub fn capture(profiles_dir: &Path, ignore: &IgnoreList, pending: PendingUploads) -> Self {
        let start = build_snapshot(profiles_dir, ignore);
        tracing::debug!(
            profiles = start.len(),
            pending = pending.len(),
            "session start captured"
        );
        Self::new(start, pending)
    }

    pub fn start(&self) -> &Snapshot {
        &self.start
    }

    pub fn pending(&self) -> &PendingUploads {
        &self.pending
    }
}
