//! `fikasync backups [<profile>]`: retained backups, newest first.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use fikasync_sync::{backup::TIMESTAMP_FORMAT, BackupManager};

use super::Globals;
use crate::locale::Msg;
use crate::render;

#[derive(Args, Debug)]
pub struct BackupsArgs {
    /// Only show backups of this profile file (e.g. `abc123.json`).
    pub profile: Option<String>,
}

impl BackupsArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let config = globals.config()?;
        let msgs = globals.messages(Some(&config));
        let manager = BackupManager::new(config.backups_dir(), config.backup_retention);

        let profiles = match self.profile {
            Some(name) => vec![name],
            None => manager.profiles().context("failed to list backup directory")?,
        };

        let mut rows = Vec::new();
        for name in &profiles {
            let entries = manager
                .list(name)
                .with_context(|| format!("failed to list backups of '{name}'"))?;
            rows.extend(entries.into_iter().map(|entry| {
                [
                    name.clone(),
                    entry.taken_at.format(TIMESTAMP_FORMAT).to_string(),
                    entry.path.display().to_string(),
                ]
            }));
        }

        if rows.is_empty() {
            println!("{}", msgs.text(Msg::NoBackups).bright_black());
            return Ok(());
        }
        let table = render::table(
            [
                msgs.text(Msg::TableFile),
                msgs.text(Msg::TableTakenAt),
                msgs.text(Msg::TablePath),
            ],
            rows,
        );
        println!("{table}");
        println!(
            "{}",
            format!("retention: {} per profile", manager.retention()).bright_black()
        );
        Ok(())
    }
}
