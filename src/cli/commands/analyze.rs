use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::HumanDuration;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::output::{banner, ensure_success, print_result, progress_sink, save_result};
use crate::config::Config;
use crate::document::{FileInput, PlainTextExtractor};
use crate::history::Source;
use crate::llm::{AnalysisClient, Simplifier};
use crate::processor::DocumentProcessor;

static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

pub async fn run(path: PathBuf, save: bool, json: bool, model: Option<String>) -> Result<()> {
    let started = Instant::now();

    let config =
        Config::load().context("Failed to load configuration. Run 'dumbifier init' first.")?;

    let file = FileInput::from_path(&path)?;

    let simplifier = AnalysisClient::new(&config.openai, config.analysis.max_chars)
        .with_model(model.as_deref());

    if !json {
        banner("Document Analysis");
        println!(
            "{}{} {}",
            PAPER,
            style(&file.name).cyan().bold(),
            style(format!("({} bytes, {})", file.size, file.mime_type)).dim()
        );
        println!("{}Model: {}", BRAIN, style(simplifier.model()).green());
        println!();
    }

    let processor = DocumentProcessor::new(
        Arc::new(simplifier),
        Arc::new(PlainTextExtractor),
        config.analysis.max_file_size,
    );

    let (bar, mut sink) = progress_sink(json)?;
    let result = processor.process_document(Some(&file), &mut *sink).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    print_result(&result, json)?;

    if save {
        save_result(&config, &result, Source::Upload, Some(&file), json).await?;
    }

    ensure_success(&result)?;

    if !json {
        println!(
            "{}Done in {}",
            SPARKLE,
            style(HumanDuration(started.elapsed())).bold()
        );
        println!();
    }

    Ok(())
}
