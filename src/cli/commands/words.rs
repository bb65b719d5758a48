use anyhow::{Context, Result};
use console::{Emoji, style};

use crate::cli::WordsAction;
use crate::cli::output::banner;
use crate::config::Config;
use crate::error::RemoteError;
use crate::remote::RemoteClient;

static STAR: Emoji<'_, '_> = Emoji("⭐ ", "[*] ");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(action: WordsAction) -> Result<()> {
    let config =
        Config::load().context("Failed to load configuration. Run 'dumbifier init' first.")?;
    let client = RemoteClient::new(&config.remote)?;

    match action {
        WordsAction::List => {
            banner("Saved Words");
            let words = client.list_words().await?;
            if words.is_empty() {
                println!("{}No saved words yet.", STAR);
                println!("  Save one with {} dumbifier define <WORD> --save", style("$").dim());
            } else {
                for saved in &words {
                    let when = saved
                        .created_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    println!("  {}{:<24} {}", STAR, style(&saved.word).cyan(), style(when).dim());
                }
            }
            println!();
        }
        WordsAction::Add { word } => match client.add_word(&word).await {
            Ok(saved) => println!("{}Saved '{}'", CHECK, style(saved.word).cyan()),
            Err(RemoteError::AlreadySaved(word)) => {
                println!("{}'{}' is already in your saved words", WARN, word)
            }
            Err(e) => return Err(e.into()),
        },
        WordsAction::Remove { word } => {
            client.remove_word(&word).await?;
            println!("{}Removed '{}'", CHECK, style(word.trim()).cyan());
        }
    }

    Ok(())
}
