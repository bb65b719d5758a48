use anyhow::{Context, Result};
use console::{Emoji, style};
use std::io::{IsTerminal, Read};
use std::sync::Arc;

use crate::cli::DocumentTypeArg;
use crate::cli::output::{banner, ensure_success, print_result, progress_sink, save_result};
use crate::config::Config;
use crate::document::{PlainTextExtractor, classify};
use crate::history::Source;
use crate::llm::{AnalysisClient, Simplifier};
use crate::processor::DocumentProcessor;

static CLIPBOARD: Emoji<'_, '_> = Emoji("📋 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");

pub async fn run(
    text: Option<String>,
    doc_type: DocumentTypeArg,
    save: bool,
    json: bool,
    model: Option<String>,
) -> Result<()> {
    let config =
        Config::load().context("Failed to load configuration. Run 'dumbifier init' first.")?;

    let text = match text {
        Some(t) => t,
        None => read_stdin(json)?,
    };

    // pasted text has no filename, so only the content can hint at the type
    let document_type = doc_type.fixed().unwrap_or_else(|| classify("", &text));

    let simplifier = AnalysisClient::new(&config.openai, config.analysis.max_chars)
        .with_model(model.as_deref());

    if !json {
        banner("Text Analysis");
        println!(
            "{}Pasted text {}",
            CLIPBOARD,
            style(format!("({} characters, {})", text.chars().count(), document_type)).dim()
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
    let result = processor
        .process_text(&text, document_type, &mut *sink)
        .await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    print_result(&result, json)?;

    if save {
        save_result(&config, &result, Source::Paste, None, json).await?;
    }

    ensure_success(&result)
}

fn read_stdin(quiet: bool) -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() && !quiet {
        println!(
            "{}",
            style("Paste the document, then press Ctrl-D:").dim()
        );
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}
