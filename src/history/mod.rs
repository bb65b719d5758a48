mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use uuid::Uuid;

use crate::document::DocumentType;
use crate::processor::ProcessingResult;

pub use store::HistoryStore;

/// Characters of the original text kept with a history entry
pub const PREVIEW_CHARS: usize = 1200;

/// How the analysed text reached the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Paste,
    Upload,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Paste => write!(f, "paste"),
            Source::Upload => write!(f, "upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One persisted history entry. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub source: Source,
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SavedFile>,
    /// Always present so renderers never have to special-case it
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl SavedAnalysis {
    /// Derive a history entry from a processing result, successful or not
    pub fn from_result(result: &ProcessingResult, source: Source) -> Self {
        let analysis = result.analysis();

        let meta = match (analysis, result.error()) {
            (Some(analysis), _) => json!({
                "wordCount": analysis.word_count,
                "model": analysis.model,
            }),
            (None, Some(error)) => json!({ "error": error }),
            (None, None) => Value::Null,
        };

        Self {
            id: Uuid::now_v7().to_string(),
            saved_at: result.processed_at(),
            source,
            document_type: result.document_type(),
            file: result.file().map(|f| SavedFile {
                name: f.name.clone(),
                size: Some(f.size),
                mime_type: Some(f.mime_type.clone()),
            }),
            summary: analysis.map(|a| a.simplified.clone()).unwrap_or_default(),
            original_preview: analysis.map(|a| a.original.chars().take(PREVIEW_CHARS).collect()),
            meta: match meta {
                Value::Object(map) => Some(map),
                _ => None,
            },
        }
    }

    /// Name shown in listings
    pub fn title(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("Pasted Text")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
