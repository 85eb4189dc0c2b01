//! FikaSync: SPT profile sync through a GitHub repository.
//!
//! # Usage
//!
//! ```text
//! fikasync run [--no-launch] [--yes]
//! fikasync pull
//! fikasync status [--json]
//! fikasync backups [<profile>]
//! fikasync init [--token <PAT>] [--repo <URL>]
//! ```
//!
//! Global flags: `--base-dir <DIR>` (else `FIKASYNC_HOME`, else the current
//! directory), `--debug`, `--lang en|ru|uk`.

mod commands;
mod locale;
mod render;
mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    backups::BackupsArgs, init::InitArgs, pull::PullArgs, run::RunArgs, status::StatusArgs,
    Globals,
};
use locale::Lang;

/// Environment variable naming the base directory when `--base-dir` is absent.
const HOME_ENV: &str = "FIKASYNC_HOME";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "fikasync",
    version,
    about = "Keep SPT/Fika profiles in sync through a GitHub repository",
    long_about = None,
)]
struct Cli {
    /// Directory holding `.env`, `.fikaignore`, `backups/` and `SPT/`.
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Verbose logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Output language: en, ru or uk.
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<Lang>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull remote progress, play, then push the session's progress.
    Run(RunArgs),

    /// Run only the startup merge.
    Pull(PullArgs),

    /// Show the local profiles as the sync sees them.
    Status(StatusArgs),

    /// List retained profile backups, newest first.
    Backups(BackupsArgs),

    /// Write the GitHub token and repository URL to `.env`.
    Init(InitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => match std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().context("could not determine current directory")?,
        },
    };
    tracing::debug!(base_dir = %base_dir.display(), "working folder");

    let globals = Globals {
        base_dir,
        lang: cli.lang,
    };
    match cli.command {
        Commands::Run(args) => args.run(&globals),
        Commands::Pull(args) => args.run(&globals),
        Commands::Status(args) => args.run(&globals),
        Commands::Backups(args) => args.run(&globals),
        Commands::Init(args) => args.run(&globals),
    }
}

/// Logs go to stderr so tables and JSON on stdout stay clean.
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
