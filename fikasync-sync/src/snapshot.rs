//! Profile fingerprints: normalized SHA-256 hash plus progress marker.
//!
//! Everything here is read-only. Per-file failures degrade to the default
//! state instead of failing the scan.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use fikasync_core::{ProfileName, ProfileState, Snapshot};

use crate::{error::io_err, ignore::IgnoreList, SyncError};

/// JSON pointer of the progress marker inside a profile.
pub const MARKER_POINTER: &str = "/characters/pmc/Hideout/sptUpdateLastRunTimestamp";

const PROFILE_EXTENSION: &str = "json";

/// Decode `bytes` as text and normalize line endings to LF.
///
/// A leading UTF-8 BOM is dropped and invalid UTF-8 is replaced, so the
/// result only depends on the text a profile carries.
pub fn normalize_content(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Lowercase hex SHA-256 of the normalized content.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_content(bytes).as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the progress marker; `0` when the content is not JSON or the
/// field is missing or not an integer.
pub fn extract_marker(bytes: &[u8]) -> i64 {
    serde_json::from_str::<serde_json::Value>(&normalize_content(bytes))
        .ok()
        .and_then(|value| value.pointer(MARKER_POINTER).and_then(|v| v.as_i64()))
        .unwrap_or(0)
}

/// Fingerprint in-memory profile content.
pub fn profile_state(bytes: &[u8]) -> ProfileState {
    ProfileState::new(content_hash(bytes), extract_marker(bytes))
}

/// Fingerprint a profile on disk.
pub fn read_state(path: &Path) -> Result<ProfileState, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(profile_state(&bytes))
}

/// Fingerprint a profile on disk, degrading any read failure to
/// [`ProfileState::absent`].
pub fn read_state_or_default(path: &Path) -> ProfileState {
    match read_state(path) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable profile treated as empty");
            ProfileState::absent()
        }
    }
}

/// Non-ignored `*.json` files directly inside `dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn profile_files(
    dir: &Path,
    ignore: &IgnoreList,
) -> Result<Vec<(ProfileName, PathBuf)>, SyncError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_err(dir, err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !is_profile_path(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if ignore.is_ignored(name) {
            tracing::debug!(file = %name, "ignored");
            continue;
        }
        files.push((ProfileName::from(name), path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Scan `dir` into a fresh [`Snapshot`].
///
/// Never fails: an unlistable directory is logged and yields an empty
/// snapshot, and an unreadable file gets the default state.
pub fn build_snapshot(dir: &Path, ignore: &IgnoreList) -> Snapshot {
    let files = match profile_files(dir, ignore) {
        Ok(files) => files,
        Err(err) => {
            tracing::warn!(error = %err, "profiles directory could not be listed");
            return Snapshot::default();
        }
    };
    files
        .into_iter()
        .map(|(name, path)| {
            let state = read_state_or_default(&path);
            (name, state)
        })
        .collect()
}

/// Whether `path` has the profile extension (`.json`, any case).
pub fn is_profile_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROFILE_EXTENSION))
}
