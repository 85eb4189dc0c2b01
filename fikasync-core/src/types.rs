//! Domain types shared by the sync engine, the transport and the CLI.
//!
//! A profile is identified by its bare filename (`alice.json`); the same
//! name is used locally, in the ignore list, in the backup tree and, under
//! the `profiles/` prefix, in the remote repository.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Directory inside the remote repository that holds every profile.
pub const REMOTE_PROFILES_DIR: &str = "profiles";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Bare filename of a profile, e.g. `alice.json`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileName(pub String);

impl ProfileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Repository-relative path of this profile: `profiles/<name>`.
    pub fn remote_path(&self) -> String {
        format!("{REMOTE_PROFILES_DIR}/{}", self.0)
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProfileName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProfileName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for ProfileName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Per-file state
// ---------------------------------------------------------------------------

/// Fingerprint of one profile: normalized content hash plus progress marker.
///
/// `timestamp` is the in-game "last processed update" counter, not wall-clock
/// time. It is only meaningful when compared against another state of the
/// same profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileState {
    pub hash: String,
    pub timestamp: i64,
}

impl ProfileState {
    pub fn new(hash: impl Into<String>, timestamp: i64) -> Self {
        Self {
            hash: hash.into(),
            timestamp,
        }
    }

    /// State used for a profile that does not exist on one side.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Shortened hash for display.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..12).unwrap_or(&self.hash)
    }
}

/// Point-in-time mapping from profile name to [`ProfileState`].
///
/// Snapshots are built whole by a directory scan and never edited afterwards;
/// every reconciliation pass produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<ProfileName, ProfileState>);

impl Snapshot {
    pub fn get(&self, name: &str) -> Option<&ProfileState> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProfileName, &ProfileState)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &ProfileName> {
        self.0.keys()
    }
}

impl FromIterator<(ProfileName, ProfileState)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (ProfileName, ProfileState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Snapshot {
    type Item = (ProfileName, ProfileState);
    type IntoIter = std::collections::btree_map::IntoIter<ProfileName, ProfileState>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Remote repository reference
// ---------------------------------------------------------------------------

/// `owner/repo` pair identifying the GitHub repository that stores profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse a `https://github.com/<owner>/<repo>[.git][/]` URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepoUrl(raw.to_string());
        let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
        if url.scheme() != "https" || url.host_str() != Some("github.com") {
            return Err(invalid());
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let [owner, repo] = segments.as_slice() else {
            return Err(invalid());
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if !is_name_component(owner) || !is_name_component(repo) {
            return Err(invalid());
        }

        Ok(Self {
            owner: (*owner).to_string(),
            repo: repo.to_string(),
        })
    }
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn is_name_component(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
