//! `fikasync pull`: startup merge without a game session.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fikasync_remote::GitHubClient;
use fikasync_sync::{pull, Workspace};

use super::{warn_unusual_token, Globals};
use crate::locale::Msg;
use crate::render;

#[derive(Args, Debug)]
pub struct PullArgs {}

impl PullArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let config = globals.config()?;
        let msgs = globals.messages(Some(&config));
        if !config.is_complete() {
            eprintln!("{}", msgs.text(Msg::SetupIncomplete).red());
            bail!("GITHUB_PAT and REPO_URL must be set");
        }
        warn_unusual_token(&config, &msgs);

        let client = GitHubClient::from_config(&config).context("invalid remote configuration")?;
        let ws = Workspace::from_config(&config);
        println!("{}", msgs.fill(Msg::RepoTarget, &[client.repo()]));

        let (report, _session) = pull(&ws, &client)
            .with_context(|| format!("failed to pull profiles from {}", client.repo()))?;
        render::print_startup(&report, &msgs);

        if !report.pending.is_empty() {
            let names: Vec<&str> = report.pending.iter().map(|name| name.as_str()).collect();
            println!(
                "{}",
                msgs.fill(Msg::SyncPending, &[&names.join(", ")]).yellow()
            );
        }
        if report.failed > 0 {
            bail!("{} profile(s) could not be updated", report.failed);
        }
        Ok(())
    }
}
