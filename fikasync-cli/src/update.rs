//! "Update available" notice against the latest GitHub release.

use colored::Colorize;
use semver::Version;

use fikasync_remote::{GitHubClient, ReleaseInfo};

use crate::locale::{Messages, Msg};

/// Newer release than `current`, if any. Unparsable tags are ignored.
pub fn newer_release(current: &Version, release: ReleaseInfo) -> Option<(Version, ReleaseInfo)> {
    let tag = release.tag.trim_start_matches(['v', 'V']);
    match Version::parse(tag) {
        Ok(latest) if latest > *current => Some((latest, release)),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(tag = %release.tag, error = %err, "release tag is not a version");
            None
        }
    }
}

/// Look up the latest release of `repo` and print a notice when it is
/// newer than this build. Failures are only logged.
pub fn check(client: &GitHubClient, repo: &str, msgs: &Messages) {
    let current = match Version::parse(env!("CARGO_PKG_VERSION")) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(error = %err, "own version does not parse");
            return;
        }
    };
    let release = match client.latest_release(repo) {
        Ok(Some(release)) => release,
        Ok(None) => {
            tracing::debug!(repo, "no release with a download asset");
            return;
        }
        Err(err) => {
            tracing::debug!(repo, error = %err, "update check failed");
            return;
        }
    };

    match newer_release(&current, release) {
        Some((latest, release)) => {
            println!("{}", msgs.text(Msg::UpdateAvailable).red().bold());
            println!(
                "{}",
                msgs.fill(Msg::UpdateBody, &[&latest, &current, &release.download_url])
            );
            println!();
        }
        None => tracing::info!("{}", msgs.fill(Msg::UpdateLatest, &[&current])),
    }
}
