use anyhow::Result;
use console::{Emoji, style};
use std::path::PathBuf;

use crate::cli::output::banner;
use crate::cli::{ExportFormat, HistoryAction};
use crate::config::Config;
use crate::history::{HistoryStore, SavedAnalysis};

static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static FILE: Emoji<'_, '_> = Emoji("📁 ", "");

const SUMMARY_PREVIEW_CHARS: usize = 80;

pub async fn run(action: HistoryAction) -> Result<()> {
    let config = Config::load_or_default()?;
    let store = HistoryStore::open(&config)?;

    match action {
        HistoryAction::List => list(&store),
        HistoryAction::Show { id } => show(&store, &id),
        HistoryAction::Remove { id } => remove(&store, &id),
        HistoryAction::Clear => clear(&store),
        HistoryAction::Export { format, output } => export(&store, format, output),
    }
}

fn list(store: &HistoryStore) -> Result<()> {
    banner("History");

    let entries = store.all();
    if entries.is_empty() {
        println!("{}No saved analyses yet.", BOOKS);
        println!(
            "  Save one with {} dumbifier analyze <FILE> --save",
            style("$").dim()
        );
        println!();
        return Ok(());
    }

    println!(
        "{}{} saved {} (max {})",
        BOOKS,
        style(entries.len()).green().bold(),
        if entries.len() == 1 { "analysis" } else { "analyses" },
        store.capacity()
    );
    println!();

    for entry in &entries {
        println!(
            "  {} {} {}",
            style(&entry.id).dim(),
            style(entry.title()).cyan().bold(),
            style(format!("[{}, {}]", entry.document_type, entry.source)).dim()
        );
        println!(
            "    {} {}",
            style(entry.saved_at.format("%Y-%m-%d %H:%M")).dim(),
            summary_line(entry)
        );
    }
    println!();

    Ok(())
}

fn show(store: &HistoryStore, id: &str) -> Result<()> {
    let Some(entry) = store.get(id) else {
        anyhow::bail!("No history entry with id '{}'", id);
    };

    banner("History Entry");
    println!("  {} {}", style("Title:").dim(), style(entry.title()).cyan().bold());
    println!("  {} {}", style("Type:").dim(), entry.document_type);
    println!("  {} {}", style("Source:").dim(), entry.source);
    println!(
        "  {} {}",
        style("Saved:").dim(),
        entry.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(meta) = &entry.meta {
        if let Some(model) = meta.get("model").and_then(|m| m.as_str()) {
            println!("  {} {}", style("Model:").dim(), model);
        }
        if let Some(error) = meta.get("error").and_then(|m| m.as_str()) {
            println!("  {} {}", style("Error:").dim(), style(error).red());
        }
    }
    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    if entry.summary.trim().is_empty() {
        println!("{}", style("No summary available.").dim());
    } else {
        println!("{}", entry.summary.trim());
    }
    println!();

    Ok(())
}

fn remove(store: &HistoryStore, id: &str) -> Result<()> {
    if store.get(id).is_none() {
        println!("{}No history entry with id '{}'", WARN, id);
        return Ok(());
    }
    if !store.remove(id) {
        anyhow::bail!("Could not write history file {}", store.path().display());
    }
    println!("{}Removed {}", CHECK, style(id).cyan());
    Ok(())
}

fn clear(store: &HistoryStore) -> Result<()> {
    if !store.clear() {
        anyhow::bail!("Could not write history file {}", store.path().display());
    }
    println!("{}History cleared", CHECK);
    Ok(())
}

fn export(store: &HistoryStore, format: ExportFormat, output: PathBuf) -> Result<()> {
    let entries = store.all();

    print!(
        "{}Exporting {} {} as {}... ",
        FILE,
        entries.len(),
        if entries.len() == 1 { "entry" } else { "entries" },
        style(format).cyan()
    );

    match format {
        ExportFormat::Json => crate::export::export_json(store, &output)?,
        ExportFormat::Markdown => crate::export::export_markdown(&entries, &output)?,
    }

    println!("{}", style("done").green());
    println!("  {} {}", style("→").dim(), style(output.display()).cyan().underlined());

    Ok(())
}

fn summary_line(entry: &SavedAnalysis) -> String {
    let flat = entry.summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return style("No summary available.").dim().to_string();
    }
    if flat.chars().count() <= SUMMARY_PREVIEW_CHARS {
        return flat;
    }
    let mut short: String = flat.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    short.push('…');
    short
}
