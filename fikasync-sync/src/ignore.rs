//! `.fikaignore`: exact profile filenames excluded from every sync step.
//!
//! One name per line; blank lines and `#` comments are skipped. Matching is
//! ASCII case-insensitive. The same predicate is used for the remote
//! listing, local snapshots and the shutdown scan.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

/// Written when the ignore file does not exist yet.
pub const TEMPLATE: &str = "# FikaSync Ignore List\n\
# Write the file names you want to ignore here (one per line).\n\
# Lines starting with # are comments.\n\
# Example:\n\
# Tested_Profile.json\n";

/// Set of ignored profile filenames, stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: BTreeSet<String>,
}

impl IgnoreList {
    /// Load the list at `path`, creating it from [`TEMPLATE`] first when it
    /// is missing.
    ///
    /// Never fails. Any I/O problem is logged and results in an empty list.
    pub fn load_or_create_at(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let list = Self::parse(&text);
                if !list.is_empty() {
                    tracing::debug!(count = list.len(), "ignore list loaded");
                }
                list
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if let Err(err) = std::fs::write(path, TEMPLATE) {
                    tracing::warn!(path = %path.display(), error = %err, "could not create ignore list");
                } else {
                    tracing::debug!(path = %path.display(), "created ignore list template");
                }
                Self::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read ignore list");
                Self::default()
            }
        }
    }

    /// Parse ignore-file text.
    pub fn parse(text: &str) -> Self {
        Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_ascii_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Whether the bare filename `name` is excluded.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Lowercased names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
