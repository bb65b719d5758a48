use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use super::{SavedAnalysis, Source};
use crate::config::Config;
use crate::processor::ProcessingResult;

/// Capacity-bounded, newest-first list of saved analyses kept in a single
/// JSON file.
///
/// Nothing here returns an error. Entries that don't decode are skipped,
/// a file that isn't JSON at all reads as an empty history, and a failed
/// write is logged and reported as `false`. Before rewriting a file it
/// could not fully read, the store copies it to `<name>.bak`.
/// Every read-modify-write runs under one lock so concurrent saves in the
/// same process can't drop each other's entries.
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            lock: Mutex::new(()),
        }
    }

    /// Store at the configured location and capacity
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(config.history_path()?, config.history.capacity))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All entries, newest first
    pub fn all(&self) -> Vec<SavedAnalysis> {
        let _guard = self.guard();
        self.load()
    }

    pub fn get(&self, id: &str) -> Option<SavedAnalysis> {
        self.all().into_iter().find(|entry| entry.id == id)
    }

    /// Insert at the head, evicting the oldest entries past capacity.
    /// Returns whether the history file was written.
    pub fn save(&self, entry: SavedAnalysis) -> bool {
        let _guard = self.guard();
        let Some(mut entries) = self.load_for_update() else {
            return false;
        };
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        if !self.persist(&entries) {
            return false;
        }
        info!("Saved history entry ({} total)", entries.len());
        true
    }

    /// Remove an entry by id. Unknown ids are a no-op; returns whether
    /// anything was removed.
    pub fn remove(&self, id: &str) -> bool {
        let _guard = self.guard();
        let Some(mut entries) = self.load_for_update() else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);

        entries.len() != before && self.persist(&entries)
    }

    pub fn clear(&self) -> bool {
        let _guard = self.guard();
        self.load_for_update().is_some() && self.persist(&[])
    }

    /// Whole history as indented JSON
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(&self.all()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Derive an entry from a processing result and save it. The entry is
    /// returned even when it could not be written.
    pub fn save_result_to_local(&self, result: &ProcessingResult, source: Source) -> SavedAnalysis {
        let entry = SavedAnalysis::from_result(result, source);
        self.save(entry.clone());
        entry
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Vec<SavedAnalysis> {
        self.read().0
    }

    /// Entries to rewrite, or `None` when the file could not be fully read
    /// and no backup of it could be made
    fn load_for_update(&self) -> Option<Vec<SavedAnalysis>> {
        let (entries, intact) = self.read();
        if !intact && !self.back_up() {
            return None;
        }
        Some(entries)
    }

    /// Decoded entries and whether every entry in the file was kept
    fn read(&self) -> (Vec<SavedAnalysis>, bool) {
        if !self.path.exists() {
            return (Vec::new(), true);
        }

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open history file {}: {}", self.path.display(), e);
                return (Vec::new(), false);
            }
        };

        let raw: Vec<Value> = match serde_json::from_reader(BufReader::new(file)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring unreadable history file {}: {}", self.path.display(), e);
                return (Vec::new(), false);
            }
        };

        let total = raw.len();
        let entries: Vec<SavedAnalysis> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable history entry #{}: {}", index, e);
                    None
                }
            })
            .collect();

        let intact = entries.len() == total;
        (entries, intact)
    }

    fn back_up(&self) -> bool {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                warn!("Kept a copy of the previous history file at {}", backup.display());
                true
            }
            Err(e) => {
                warn!("Failed to back up history file to {}: {}", backup.display(), e);
                false
            }
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    fn persist(&self, entries: &[SavedAnalysis]) -> bool {
        match self.atomic_write(entries) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write history file: {:#}", e);
                false
            }
        }
    }

    fn atomic_write(&self, entries: &[SavedAnalysis]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let file = File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries).context("Failed to serialize history")?;
        writer.flush().context("Failed to flush history")?;
        writer.get_ref().sync_all().context("Failed to sync history")?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
