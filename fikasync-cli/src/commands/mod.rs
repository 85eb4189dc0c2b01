pub mod backups;
pub mod init;
pub mod pull;
pub mod run;
pub mod status;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use fikasync_core::Config;

use crate::locale::{Lang, Messages, Msg};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Globals {
    pub base_dir: PathBuf,
    pub lang: Option<Lang>,
}

impl Globals {
    pub fn config(&self) -> Result<Config> {
        Config::load_at(&self.base_dir).with_context(|| {
            format!(
                "failed to load configuration from '{}'",
                self.base_dir.display()
            )
        })
    }

    /// `--lang`, else `FIKASYNC_LANG`, else the system locale.
    pub fn messages(&self, config: Option<&Config>) -> Messages {
        let lang = self.lang.or_else(|| {
            let raw = config?.lang.as_deref()?;
            match raw.parse::<Lang>() {
                Ok(lang) => Some(lang),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring configured language");
                    None
                }
            }
        });
        Messages::new(lang.unwrap_or_else(Lang::from_system))
    }
}

/// Warn when the loaded `GITHUB_PAT` has an unexpected format. The session
/// still goes ahead with it.
pub fn warn_unusual_token(config: &Config, msgs: &Messages) {
    if config.has_unusual_token() {
        tracing::warn!("GITHUB_PAT does not match a known GitHub token format");
        println!("{}", msgs.text(Msg::TokenUnusualLoaded).yellow());
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Print `question` and read one trimmed line. `None` at end of input.
pub fn prompt(question: &str) -> Result<Option<String>> {
    print!("{question} ");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Yes/no question defaulting to yes. `assume_yes` skips the prompt; end
/// of input counts as no.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let Some(answer) = prompt(&format!("{question} [Y/n]"))? else {
        return Ok(false);
    };
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.to_lowercase().as_str(),
        "" | "y" | "yes" | "д" | "да" | "т" | "так"
    )
}
