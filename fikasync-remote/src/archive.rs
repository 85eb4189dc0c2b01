//! Repository archive extraction.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::ZipArchive;

use fikasync_sync::snapshot::is_profile_path;
use fikasync_sync::RemoteTree;

use crate::error::{io_err, GitHubError};

/// Extract a zipball into a fresh temporary directory and list every
/// profile file in it.
pub fn materialize(bytes: &[u8]) -> Result<RemoteTree, GitHubError> {
    let dir = tempfile::Builder::new()
        .prefix("fikasync-")
        .tempdir()
        .map_err(|e| io_err(std::env::temp_dir(), e))?;
    extract_zip(bytes, dir.path())?;
    let files = collect_profiles(dir.path());
    tracing::debug!(files = files.len(), dir = %dir.path().display(), "archive extracted");
    Ok(RemoteTree::new(dir, files))
}

/// Unpack `bytes` under `dest`. Entries escaping `dest` are skipped.
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<(), GitHubError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = %entry.name(), "skipping archive entry outside the target");
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| io_err(&outpath, e))?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| io_err(&outpath, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| io_err(&outpath, e))?;
    }
    Ok(())
}

/// All `*.json` files below `root`, recursively, sorted by path.
pub fn collect_profiles(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_profile_path(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
