use anyhow::{Context, Result};
use console::{Emoji, style};

use crate::config::Config;
use crate::dictionary::{DictionaryClient, split_definitions};
use crate::error::RemoteError;
use crate::remote::RemoteClient;

static BOOK: Emoji<'_, '_> = Emoji("📖 ", "");
static STAR: Emoji<'_, '_> = Emoji("⭐ ", "[*] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

pub async fn run(word: String, save: bool) -> Result<()> {
    let config =
        Config::load().context("Failed to load configuration. Run 'dumbifier init' first.")?;

    let client = DictionaryClient::new(&config.dictionary);
    let entry = client.lookup(&word).await?;

    println!();
    println!("{}{}", BOOK, style(&entry.word).cyan().bold());
    println!();
    for definition in split_definitions(&entry.definition) {
        println!("  {}", definition);
    }

    if let Some(example) = &entry.example {
        println!();
        println!("  {} {}", style("Example:").dim(), style(example).italic());
    }
    if !entry.synonyms.is_empty() {
        println!("  {} {}", style("Synonyms:").dim(), entry.synonyms.join(", "));
    }
    if !entry.antonyms.is_empty() {
        println!("  {} {}", style("Antonyms:").dim(), entry.antonyms.join(", "));
    }
    println!();

    if save {
        let remote = RemoteClient::new(&config.remote)?;
        match remote.add_word(&entry.word).await {
            Ok(saved) => println!("{}Saved '{}'", STAR, style(saved.word).cyan()),
            Err(RemoteError::AlreadySaved(word)) => {
                println!("{}'{}' is already in your saved words", WARN, word)
            }
            Err(e) => return Err(e.into()),
        }
        println!();
    }

    Ok(())
}
