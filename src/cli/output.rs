use anyhow::Result;
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::document::FileInput;
use crate::history::{HistoryStore, Source};
use crate::processor::{ProcessingResult, ProcessingStep, ProgressEvent, ProgressSink, ignore_progress};
use crate::remote::{RemoteClient, persist_best_effort};

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
static CLOUD: Emoji<'_, '_> = Emoji("☁️  ", "");

pub fn banner(title: &str) {
    println!();
    println!("{}", style(format!(" Dumbifier - {} ", title)).bold().reverse());
    println!();
}

/// A progress bar driven by processing events, or a silent sink when the
/// output has to stay machine readable
pub fn progress_sink(quiet: bool) -> Result<(Option<ProgressBar>, Box<ProgressSink<'static>>)> {
    if quiet {
        return Ok((None, Box::new(ignore_progress)));
    }

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("█▓░"),
    );

    let handle = bar.clone();
    let sink = move |event: ProgressEvent| {
        if event.step != ProcessingStep::Error {
            handle.set_position(u64::from(event.progress));
        }
        handle.set_message(event.message);
    };

    Ok((Some(bar), Box::new(sink)))
}

/// Render a processing result. Failures are left to the caller.
pub fn print_result(result: &ProcessingResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let Some(analysis) = result.analysis() else {
        return Ok(());
    };

    let name = result.file().map(|f| f.name.as_str()).unwrap_or("Pasted Text");
    let counts = analysis.word_count;

    println!(
        "{}Simplified {} {}",
        CHECK,
        style(name).cyan().bold(),
        style(format!("({})", result.document_type())).dim()
    );
    println!(
        "  {} {} → {} words",
        style("Words:").dim(),
        style(counts.original).yellow(),
        style(counts.simplified).green().bold()
    );
    if counts.original > 0 && counts.simplified < counts.original {
        let saved = 100 - counts.simplified * 100 / counts.original;
        println!("  {} {}% shorter", style("Reduction:").dim(), style(saved).green());
    }
    println!("  {} {}", style("Model:").dim(), analysis.model);
    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}", analysis.simplified.trim());
    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();

    Ok(())
}

/// Save a successful result locally, then mirror it to the remote account
/// when one is configured
pub async fn save_result(
    config: &Config,
    result: &ProcessingResult,
    source: Source,
    upload: Option<&FileInput>,
    quiet: bool,
) -> Result<()> {
    if !result.success() {
        return Ok(());
    }

    let store = HistoryStore::open(config)?;
    let entry = store.save_result_to_local(result, source);
    if store.get(&entry.id).is_none() {
        anyhow::bail!(
            "Could not write history file {}",
            store.path().display()
        );
    }
    if !quiet {
        println!(
            "{}Saved to history as {}",
            SAVE,
            style(&entry.id).cyan()
        );
    }

    if config.remote.is_authenticated() {
        let client = RemoteClient::new(&config.remote)?;
        let sent = persist_best_effort(&client, result, upload).await;
        if sent && !quiet {
            println!("{}Saved to {}", CLOUD, style(client.base_url()).dim());
        }
    }

    Ok(())
}

/// Turn a failed result into a non-zero exit
pub fn ensure_success(result: &ProcessingResult) -> Result<()> {
    match result.error() {
        Some(error) if !result.success() => anyhow::bail!("{}", error),
        _ => Ok(()),
    }
}
