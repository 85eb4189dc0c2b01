#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fikasync_sync::{BackupManager, IgnoreList, RemoteError, RemoteStore, RemoteTree, Workspace};
use tempfile::TempDir;

/// Repository held in memory, keyed by repo-relative path.
#[derive(Default)]
pub struct MemoryRemote {
    pub files: RefCell<BTreeMap<String, Vec<u8>>>,
    pub writes: RefCell<Vec<String>>,
    pub reads: RefCell<Vec<String>>,
}

impl MemoryRemote {
    pub fn with_profiles(profiles: &[(&str, String)]) -> Self {
        let remote = Self::default();
        for (name, content) in profiles {
            remote.put(name, content);
        }
        remote
    }

    /// Store `content` under `profiles/<name>`.
    pub fn put(&self, name: &str, content: &str) {
        self.files
            .borrow_mut()
            .insert(format!("profiles/{name}"), content.as_bytes().to_vec());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(&format!("profiles/{name}"))
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl RemoteStore for MemoryRemote {
    fn fetch_tree(&self) -> Result<RemoteTree, RemoteError> {
        let dir = TempDir::new().map_err(|e| RemoteError::Transport(e.to_string()))?;
        // Mimic the archive layout: a single top-level `<owner>-<repo>-<sha>` directory.
        let top = dir.path().join("owner-repo-abc123");
        let mut files = Vec::new();
        for (path, content) in self.files.borrow().iter() {
            let dest = top.join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| RemoteError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs::write(&dest, content).map_err(|e| RemoteError::Io {
                path: dest.clone(),
                source: e,
            })?;
            files.push(dest);
        }
        Ok(RemoteTree::new(dir, files))
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        self.reads.borrow_mut().push(path.to_string());
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        self.writes.borrow_mut().push(path.to_string());
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_vec());
        Ok(())
    }
}

/// Remote whose listing always fails.
pub struct OfflineRemote;

impl RemoteStore for OfflineRemote {
    fn fetch_tree(&self) -> Result<RemoteTree, RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }

    fn read_file(&self, _path: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }

    fn write_file(&self, _path: &str, _content: &[u8]) -> Result<(), RemoteError> {
        Err(RemoteError::Transport("connection refused".into()))
    }
}

pub fn profile_json(ts: i64) -> String {
    format!(
        r#"{{"info":{{"id":"x"}},"characters":{{"pmc":{{"Hideout":{{"sptUpdateLastRunTimestamp":{ts}}}}}}}}}"#
    )
}

/// Same marker, different content.
pub fn profile_json_with(ts: i64, tag: &str) -> String {
    format!(
        r#"{{"info":{{"id":"{tag}"}},"characters":{{"pmc":{{"Hideout":{{"sptUpdateLastRunTimestamp":{ts}}}}}}}}}"#
    )
}

pub struct LocalSide {
    pub home: TempDir,
    pub ws: Workspace,
}

impl LocalSide {
    pub fn new(ignored: &[&str]) -> Self {
        let home = TempDir::new().expect("home");
        let profiles = home.path().join("SPT/user/profiles");
        fs::create_dir_all(&profiles).expect("profiles dir");
        let ws = Workspace::new(
            profiles,
            IgnoreList::from_names(ignored),
            BackupManager::new(home.path().join("backups"), 5),
        );
        Self { home, ws }
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.ws.profiles_dir.join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.profile_path(name), content).expect("write profile");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.profile_path(name)).expect("read profile")
    }

    pub fn backups_root(&self) -> &Path {
        self.ws.backups.root()
    }
}
