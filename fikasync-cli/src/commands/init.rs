//! `fikasync init [--token <PAT>] [--repo <URL>]`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use fikasync_core::config::{save_env_at, validate_token, KEY_LANG, KEY_REPO_URL, KEY_TOKEN};
use fikasync_core::RepoRef;

use super::{prompt, Globals};
use crate::locale::{Messages, Msg};

/// Write the GitHub token and repository URL to `<base>/.env`.
///
/// Missing values are asked for on stdin. `--lang`, when given, is saved
/// as the default language.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// GitHub personal access token with contents access to the repository.
    #[arg(long, value_name = "PAT")]
    pub token: Option<String>,

    /// Repository URL, e.g. https://github.com/<owner>/<repo>.
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,
}

impl InitArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let msgs = globals.messages(globals.config().ok().as_ref());

        let token = match self.token {
            Some(token) => token.trim().to_string(),
            None => ask_until(&msgs, Msg::TokenPrompt, |answer| {
                (!answer.is_empty()).then(|| answer.to_string())
            })?,
        };
        if token.is_empty() {
            bail!("the token must not be empty");
        }
        if !validate_token(&token) {
            tracing::warn!("token format is unusual");
            println!("{}", msgs.text(Msg::TokenUnusual).yellow());
        }

        let repo = match self.repo {
            Some(raw) => RepoRef::parse(&raw)
                .map(|_| raw.trim().to_string())
                .with_context(|| msgs.text(Msg::UrlInvalid))?,
            None => ask_until(&msgs, Msg::UrlPrompt, |answer| match RepoRef::parse(answer) {
                Ok(_) => Some(answer.to_string()),
                Err(_) => {
                    println!("{}", msgs.text(Msg::UrlInvalid).red());
                    None
                }
            })?,
        };

        let lang = globals.lang.map(|lang| lang.to_string());
        let mut updates = vec![(KEY_TOKEN, token.as_str()), (KEY_REPO_URL, repo.as_str())];
        if let Some(lang) = lang.as_deref() {
            updates.push((KEY_LANG, lang));
        }

        let path = save_env_at(&globals.base_dir, &updates)
            .with_context(|| format!("failed to write .env in '{}'", globals.base_dir.display()))?;
        println!(
            "{} {}",
            "✓".green(),
            msgs.fill(Msg::ConfigSaved, &[&path.display()])
        );
        Ok(())
    }
}

/// Prompt until `accept` returns a value. End of input is an error.
fn ask_until<F>(msgs: &Messages, question: Msg, mut accept: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    loop {
        let Some(answer) = prompt(msgs.text(question))? else {
            bail!("no input while waiting for an answer");
        };
        if let Some(value) = accept(&answer) {
            return Ok(value);
        }
    }
}
