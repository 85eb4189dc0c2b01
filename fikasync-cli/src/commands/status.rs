//! `fikasync status [--json]`: local snapshot after ignore filtering.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use fikasync_core::Snapshot;
use fikasync_sync::{snapshot::build_snapshot, Workspace};

use super::Globals;
use crate::locale::{Messages, Msg};
use crate::render;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let config = globals.config()?;
        let ws = Workspace::from_config(&config);
        let snapshot = build_snapshot(&ws.profiles_dir, &ws.ignore);

        if self.json {
            let payload = StatusJson {
                profiles_dir: ws.profiles_dir.display().to_string(),
                ignored: ws.ignore.iter().map(str::to_string).collect(),
                profiles: snapshot
                    .iter()
                    .map(|(name, state)| ProfileJson {
                        file: name.to_string(),
                        timestamp: state.timestamp,
                        hash: state.hash.clone(),
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&snapshot, &ws, &globals.messages(Some(&config)));
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    profiles_dir: String,
    ignored: Vec<String>,
    profiles: Vec<ProfileJson>,
}

#[derive(Serialize)]
struct ProfileJson {
    file: String,
    timestamp: i64,
    hash: String,
}

fn print_table(snapshot: &Snapshot, ws: &Workspace, msgs: &Messages) {
    println!(
        "FikaSync v{} | {} | {} ignored",
        env!("CARGO_PKG_VERSION"),
        ws.profiles_dir.display(),
        ws.ignore.len(),
    );
    if snapshot.is_empty() {
        println!("{}", msgs.text(Msg::SyncNoLocal).bright_black());
        return;
    }

    let rows = snapshot.iter().map(|(name, state)| {
        [
            name.to_string(),
            state.timestamp.to_string(),
            state.short_hash().to_string(),
        ]
    });
    let table = render::table(
        [
            msgs.text(Msg::TableFile),
            msgs.text(Msg::TableMarker),
            msgs.text(Msg::TableHash),
        ],
        rows,
    );
    println!("{table}");
}
