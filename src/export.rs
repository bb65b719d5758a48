use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::history::{HistoryStore, SavedAnalysis};

/// Export the whole history as pretty-printed JSON
pub fn export_json(store: &HistoryStore, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(store.export().as_bytes())
        .context("Failed to write JSON")?;
    writer.flush()?;

    Ok(())
}

/// Export history entries as a readable Markdown digest
pub fn export_markdown(entries: &[SavedAnalysis], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write_markdown(entries, &mut writer)?;
    writer.flush()?;

    Ok(())
}

fn write_markdown<W: Write>(entries: &[SavedAnalysis], writer: &mut W) -> Result<()> {
    writeln!(writer, "# Dumbifier History")?;
    writeln!(writer)?;

    if entries.is_empty() {
        writeln!(writer, "_No saved analyses._")?;
        return Ok(());
    }

    for entry in entries {
        writeln!(writer, "## {}", escape_heading(entry.title()))?;
        writeln!(writer)?;
        writeln!(writer, "- **ID:** `{}`", entry.id)?;
        writeln!(writer, "- **Type:** {}", entry.document_type)?;
        writeln!(writer, "- **Source:** {}", entry.source)?;
        writeln!(
            writer,
            "- **Saved:** {}",
            entry.saved_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(writer)?;

        if entry.summary.trim().is_empty() {
            writeln!(writer, "_No summary available._")?;
        } else {
            writeln!(writer, "{}", entry.summary.trim())?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn escape_heading(s: &str) -> String {
    s.replace('\n', " ").replace('#', "\\#")
}
