//! Blocking GitHub REST v3 client.

use std::io::Read;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use url::Url;

use fikasync_core::{Config, ConfigError, RepoRef};
use fikasync_sync::{RemoteError, RemoteStore, RemoteTree};

use crate::archive;
use crate::error::GitHubError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RELEASE_ASSET_EXTENSION: &str = ".7z";

/// Latest published release of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub tag: String,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContent<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: Url,
    token: String,
    repo: RepoRef,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, repo: RepoRef) -> Result<Self, GitHubError> {
        Self::with_base_url(DEFAULT_BASE_URL, token, repo)
    }

    pub fn with_base_url(
        base_url: &str,
        token: impl Into<String>,
        repo: RepoRef,
    ) -> Result<Self, GitHubError> {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Ok(Self {
            agent,
            base_url: Url::parse(base_url)?,
            token: token.into(),
            repo,
        })
    }

    /// Client for the repository, token and API URL in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let repo = config.repo()?;
        let token = config.token()?;
        Self::with_base_url(&config.api_url, token, repo).map_err(|_| ConfigError::InvalidValue {
            key: fikasync_core::config::KEY_API_URL,
            value: config.api_url.clone(),
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Login of the token owner. Fails when the token is rejected.
    pub fn whoami(&self) -> Result<String, GitHubError> {
        let url = self.endpoint(&["user"])?;
        let response = expect_found(&url, self.get(&url, ACCEPT_JSON).call())?;
        let user: User = response
            .into_json()
            .map_err(|e| GitHubError::Decode(e.to_string()))?;
        tracing::debug!(login = %user.login, "token accepted");
        Ok(user.login)
    }

    /// Raw bytes of the repository zipball.
    pub fn download_zipball(&self) -> Result<Vec<u8>, GitHubError> {
        let url = self.endpoint(&["repos", self.repo.owner.as_str(), self.repo.repo.as_str(), "zipball"])?;
        let response = expect_found(&url, self.get(&url, ACCEPT_JSON).call())?;
        let bytes = read_body(response)?;
        tracing::debug!(repo = %self.repo, bytes = bytes.len(), "zipball downloaded");
        Ok(bytes)
    }

    /// Latest release of `repo` (`owner/name`) carrying a `.7z` asset.
    ///
    /// `None` when the repository has no release or no such asset.
    pub fn latest_release(&self, repo: &str) -> Result<Option<ReleaseInfo>, GitHubError> {
        let mut segments = vec!["repos"];
        segments.extend(repo.split('/'));
        segments.extend(["releases", "latest"]);
        let url = self.endpoint(&segments)?;

        let Some(response) = check(&url, self.get(&url, ACCEPT_JSON).call())? else {
            return Ok(None);
        };
        let release: Release = response
            .into_json()
            .map_err(|e| GitHubError::Decode(e.to_string()))?;
        Ok(release
            .assets
            .into_iter()
            .find(|asset| {
                asset
                    .name
                    .to_ascii_lowercase()
                    .ends_with(RELEASE_ASSET_EXTENSION)
            })
            .map(|asset| ReleaseInfo {
                tag: release.tag_name,
                download_url: asset.browser_download_url,
            }))
    }

    /// Raw content of a repository file, `None` when it does not exist.
    pub fn get_contents(&self, path: &str) -> Result<Option<Vec<u8>>, GitHubError> {
        let url = self.contents_url(path)?;
        match check(&url, self.get(&url, ACCEPT_RAW).call())? {
            Some(response) => read_body(response).map(Some),
            None => Ok(None),
        }
    }

    /// Create or update a repository file through the contents API.
    ///
    /// The current blob sha is looked up first so existing files are
    /// updated instead of rejected.
    pub fn put_contents(&self, path: &str, content: &[u8]) -> Result<(), GitHubError> {
        let url = self.contents_url(path)?;
        let sha = match check(&url, self.get(&url, ACCEPT_JSON).call())? {
            Some(response) => {
                let meta: ContentMeta = response
                    .into_json()
                    .map_err(|e| GitHubError::Decode(e.to_string()))?;
                Some(meta.sha)
            }
            None => None,
        };

        let name = path.rsplit('/').next().unwrap_or(path);
        let body = PutContent {
            message: format!("Update profile {name}"),
            content: STANDARD.encode(content),
            sha: sha.as_deref(),
        };
        let request = self
            .agent
            .put(url.as_str())
            .set("Authorization", &format!("token {}", self.token))
            .set("User-Agent", &user_agent())
            .set("Accept", ACCEPT_JSON);
        expect_found(&url, request.send_json(&body))?;
        tracing::debug!(path, update = sha.is_some(), "contents written");
        Ok(())
    }

    // ── helpers ──────────────────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::Decode(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, GitHubError> {
        let mut segments = vec!["repos", self.repo.owner.as_str(), self.repo.repo.as_str(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments)
    }

    fn get(&self, url: &Url, accept: &str) -> ureq::Request {
        self.agent
            .get(url.as_str())
            .set("Authorization", &format!("token {}", self.token))
            .set("User-Agent", &user_agent())
            .set("Accept", accept)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

impl RemoteStore for GitHubClient {
    fn fetch_tree(&self) -> Result<RemoteTree, RemoteError> {
        let bytes = self.download_zipball()?;
        Ok(archive::materialize(&bytes)?)
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        Ok(self.get_contents(path)?)
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), RemoteError> {
        Ok(self.put_contents(path, content)?)
    }
}

fn user_agent() -> String {
    format!("FikaSync/{}", env!("CARGO_PKG_VERSION"))
}

/// Map a ureq result: success passes through, 404 becomes `None`, other
/// statuses and transport failures become errors.
fn check(
    url: &Url,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Option<ureq::Response>, GitHubError> {
    match result {
        Ok(response) => Ok(Some(response)),
        Err(ureq::Error::Status(404, _)) => Ok(None),
        Err(ureq::Error::Status(status, _)) => Err(GitHubError::Http {
            status,
            url: url.to_string(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(GitHubError::Transport(transport.to_string())),
    }
}

/// Like [`check`], but a 404 is an error too.
fn expect_found(
    url: &Url,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, GitHubError> {
    check(url, result)?.ok_or_else(|| GitHubError::Http {
        status: 404,
        url: url.to_string(),
    })
}

fn read_body(response: ureq::Response) -> Result<Vec<u8>, GitHubError> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| GitHubError::Transport(e.to_string()))?;
    Ok(bytes)
}
