mod classifier;
mod extractor;
mod text;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use classifier::classify;
pub use extractor::{PlainTextExtractor, TextExtractor};

/// Kind of legal document, steers which prompt heading is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    #[default]
    Tos,
    PrivacyPolicy,
    Eula,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Tos => "tos",
            DocumentType::PrivacyPolicy => "privacy-policy",
            DocumentType::Eula => "eula",
            DocumentType::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tos" => Ok(DocumentType::Tos),
            "privacy-policy" => Ok(DocumentType::PrivacyPolicy),
            "eula" => Ok(DocumentType::Eula),
            "other" => Ok(DocumentType::Other),
            other => Err(format!("Unknown document type: {}", other)),
        }
    }
}

/// Metadata reported back for file-sourced results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A file handed to the processor. Contents are read lazily by an extractor.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileInput {
    /// Stat a file on disk and guess its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

        if !metadata.is_file() {
            anyhow::bail!("Not a file: {}", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            mime_type: guess_mime(path),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Lowercased name, used for extension checks
    pub fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            name: self.name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
            last_modified: self.last_modified,
        }
    }
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
