//! `fikasync run [--no-launch] [--yes]`: one full play session.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fikasync_core::Config;
use fikasync_launcher::{GameLauncher, LaunchError};
use fikasync_remote::GitHubClient;
use fikasync_sync::{pull, push, SessionContext, Workspace};

use super::{confirm, prompt, warn_unusual_token, Globals};
use crate::locale::{Messages, Msg};
use crate::{render, update};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the game; push right after the startup merge.
    #[arg(long)]
    pub no_launch: bool,

    /// Answer yes to every question.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl RunArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let config = globals.config()?;
        let msgs = globals.messages(Some(&config));
        println!(
            "{}",
            format!(" FikaSync v{} ", env!("CARGO_PKG_VERSION"))
                .white()
                .on_cyan()
        );

        if !config.is_complete() {
            eprintln!("{}", msgs.text(Msg::SetupIncomplete).red());
            bail!("GITHUB_PAT and REPO_URL must be set");
        }
        warn_unusual_token(&config, &msgs);
        let client = GitHubClient::from_config(&config).context("invalid remote configuration")?;
        let ws = Workspace::from_config(&config);
        println!("{}", msgs.fill(Msg::RepoTarget, &[client.repo()]));

        // Startup: a session context only exists when the merge succeeded.
        let session = match self.startup(&config, &client, &ws, &msgs) {
            Some(session) => Some(session),
            None if self.no_launch => return Ok(()),
            None => {
                if !confirm(msgs.text(Msg::StartGameNoSync), self.yes)? {
                    println!("{}", msgs.text(Msg::LaunchCanceled).bright_black());
                    return Ok(());
                }
                None
            }
        };

        let ended_normally = self.no_launch || self.play(&config, &msgs);

        match session {
            Some(session) if ended_normally => {
                let report = push(&ws, &client, &session);
                render::print_shutdown(&report, &msgs);
            }
            Some(_) => tracing::info!("session did not end normally, skipping upload"),
            None => tracing::info!("startup merge did not run, skipping upload"),
        }
        Ok(())
    }

    /// Token check, update notice and startup merge. `None` means offline
    /// or a failed merge.
    fn startup(
        &self,
        config: &Config,
        client: &GitHubClient,
        ws: &Workspace,
        msgs: &Messages,
    ) -> Option<SessionContext> {
        match client.whoami() {
            Ok(login) => println!("{}", msgs.fill(Msg::AuthSuccess, &[&login]).green()),
            Err(err) => {
                tracing::warn!(error = %err, "token check failed");
                println!("{}", msgs.text(Msg::OfflineMode).yellow());
                return None;
            }
        }

        update::check(client, &config.release_repo, msgs);

        match pull(ws, client) {
            Ok((report, session)) => {
                render::print_startup(&report, msgs);
                Some(session)
            }
            Err(err) => {
                tracing::error!(error = %err, "startup merge failed");
                eprintln!("{}", msgs.fill(Msg::SyncFailed, &[&err]).red());
                None
            }
        }
    }

    /// Run the game until the user presses Enter. `false` when the session
    /// broke off, so no upload should follow.
    fn play(&self, config: &Config, msgs: &Messages) -> bool {
        println!();
        println!("{}", msgs.text(Msg::GameStarting).yellow().bold());

        let launcher = GameLauncher::from_config(config);
        let instruction = msgs.text(Msg::GameCloseInstruction);
        match launcher.launch(|| wait_for_enter(instruction)) {
            Ok(outcome) => {
                if outcome.server_ready {
                    println!("{}", msgs.fill(Msg::ServerSuccess, &[&outcome.endpoint]).green());
                } else {
                    println!("{}", msgs.text(Msg::ServerTimeout).yellow());
                }
                if !outcome.launcher_started {
                    println!("{}", msgs.text(Msg::LauncherNotFound).yellow());
                }
                true
            }
            Err(err @ LaunchError::ServerExited { .. }) => {
                tracing::error!(error = %err, "server stopped during startup");
                eprintln!("{}", msgs.text(Msg::ServerExited).red());
                false
            }
            Err(err) => {
                tracing::error!(error = %err, "game session failed");
                eprintln!("{}", msgs.fill(Msg::ResultError, &[&err]).red());
                false
            }
        }
    }
}

fn wait_for_enter(instruction: &str) {
    println!();
    if let Err(err) = prompt(instruction) {
        tracing::debug!(error = %err, "stdin closed while waiting");
    }
}
