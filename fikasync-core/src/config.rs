//! `.env` backed configuration.
//!
//! # Layout under the base directory
//!
//! ```text
//! <base>/
//!   .env                      GITHUB_PAT, REPO_URL, optional tuning keys
//!   .fikaignore               exact profile filenames to leave alone
//!   backups/<file>/<ts>/<file>
//!   SPT/SPT.Server.exe
//!   SPT/SPT.Launcher.exe
//!   SPT/user/profiles/*.json
//! ```
//!
//! # API pattern
//!
//! [`Config::load_at`] reads `<base>/.env` without touching the process
//! environment and resolves every key through [`Config::from_lookup`]; tests
//! call `from_lookup` directly with a map so they never depend on the
//! ambient environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::RepoRef;

pub const ENV_FILE: &str = ".env";
pub const IGNORE_FILE: &str = ".fikaignore";
pub const BACKUPS_DIR: &str = "backups";

pub const KEY_TOKEN: &str = "GITHUB_PAT";
pub const KEY_REPO_URL: &str = "REPO_URL";
pub const KEY_BACKUP_RETENTION: &str = "FIKASYNC_BACKUP_RETENTION";
pub const KEY_LANG: &str = "FIKASYNC_LANG";
pub const KEY_API_URL: &str = "FIKASYNC_API_URL";
pub const KEY_RELEASE_REPO: &str = "FIKASYNC_RELEASE_REPO";

pub const DEFAULT_BACKUP_RETENTION: usize = 5;
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RELEASE_REPO: &str = "fanteeek/FikaSync";

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_dir: PathBuf,
    pub github_token: Option<String>,
    pub repo_url: Option<String>,
    /// Backups kept per profile.
    pub backup_retention: usize,
    pub lang: Option<String>,
    pub api_url: String,
    pub release_repo: String,
}

impl Config {
    /// Load `<base_dir>/.env` (if present) and resolve all keys.
    ///
    /// Variables already set in the process environment take precedence
    /// over the file.
    pub fn load_at(base_dir: &Path) -> Result<Self, ConfigError> {
        let file_values = read_env_file(&base_dir.join(ENV_FILE))?;
        Self::from_lookup(base_dir, |key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        })
    }

    /// Resolve every key through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backup_retention = match get(KEY_BACKUP_RETENTION) {
            None => DEFAULT_BACKUP_RETENTION,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: KEY_BACKUP_RETENTION,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            github_token: get(KEY_TOKEN),
            repo_url: get(KEY_REPO_URL),
            backup_retention,
            lang: get(KEY_LANG),
            api_url: get(KEY_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            release_repo: get(KEY_RELEASE_REPO).unwrap_or_else(|| DEFAULT_RELEASE_REPO.to_string()),
        })
    }

    /// The GitHub token, or [`ConfigError::MissingKey`].
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.github_token
            .as_deref()
            .ok_or(ConfigError::MissingKey(KEY_TOKEN))
    }

    /// The parsed `REPO_URL`.
    pub fn repo(&self) -> Result<RepoRef, ConfigError> {
        let raw = self
            .repo_url
            .as_deref()
            .ok_or(ConfigError::MissingKey(KEY_REPO_URL))?;
        RepoRef::parse(raw)
    }

    /// Both remote keys are present (format is not checked).
    pub fn is_complete(&self) -> bool {
        self.github_token.is_some() && self.repo_url.is_some()
    }

    /// A token is set but does not look like a GitHub token. Loading still
    /// succeeds; callers only warn.
    pub fn has_unusual_token(&self) -> bool {
        self.github_token
            .as_deref()
            .is_some_and(|token| !validate_token(token))
    }

    pub fn env_path(&self) -> PathBuf {
        self.base_dir.join(ENV_FILE)
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.base_dir.join(IGNORE_FILE)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.base_dir.join(BACKUPS_DIR)
    }

    pub fn spt_dir(&self) -> PathBuf {
        self.base_dir.join("SPT")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.spt_dir().join("user").join("profiles")
    }

    pub fn server_path(&self) -> PathBuf {
        self.spt_dir().join("SPT.Server.exe")
    }

    pub fn launcher_path(&self) -> PathBuf {
        self.spt_dir().join("SPT.Launcher.exe")
    }
}

/// Whether `token` looks like a GitHub personal access token.
///
/// Classic (`ghp_`) and app (`ghs_`) tokens carry at least 36 characters
/// after the prefix; fine-grained tokens start with `github_pat_`.
pub fn validate_token(token: &str) -> bool {
    let body_ok = |body: &str, min: usize| {
        body.len() >= min && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if let Some(body) = token.strip_prefix("ghp_").or_else(|| token.strip_prefix("ghs_")) {
        return body_ok(body, 36);
    }
    if let Some(body) = token.strip_prefix("github_pat_") {
        return body_ok(body, 22);
    }
    false
}

/// Set `updates` in `<base_dir>/.env`, keeping every other line as is.
///
/// Existing assignments of an updated key are replaced in place; new keys
/// are appended. The file is written to `.env.tmp` and renamed.
pub fn save_env_at(base_dir: &Path, updates: &[(&str, &str)]) -> Result<PathBuf, ConfigError> {
    let path = base_dir.join(ENV_FILE);
    let existing = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(io_err(&path, e)),
    };

    let mut pending: Vec<(&str, &str)> = updates.to_vec();
    let mut lines: Vec<String> = Vec::new();
    for line in existing.lines() {
        let key = line
            .split_once('=')
            .map(|(k, _)| k.trim().trim_start_matches("export ").trim());
        match key.and_then(|k| pending.iter().position(|(pk, _)| *pk == k)) {
            Some(idx) => {
                let (k, v) = pending.remove(idx);
                lines.push(format!("{k}={}", quote_value(v)));
            }
            None => lines.push(line.to_string()),
        }
    }
    for (k, v) in pending {
        lines.push(format!("{k}={}", quote_value(v)));
    }

    let mut body = lines.join("\n");
    body.push('\n');

    std::fs::create_dir_all(base_dir).map_err(|e| io_err(base_dir, e))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

fn quote_value(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || c == '#' || c == '"') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HashMap::new())
        }
        Err(source) => {
            return Err(ConfigError::Env {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut values = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::Env {
            path: path.to_path_buf(),
            source,
        })?;
        values.insert(key, value);
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
