use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::DictionaryConfig;
use crate::error::DictionaryError;

static NUMBERED_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s").expect("Invalid regex"));

/// A single dictionary lookup result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
}

pub struct DictionaryClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn lookup(&self, word: &str) -> Result<DictionaryEntry, DictionaryError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(DictionaryError::EmptyWord);
        }
        if !self.is_configured() {
            return Err(DictionaryError::NotConfigured);
        }

        debug!("Looking up '{}'", word);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("word", word)])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DictionaryError::Upstream(response.status().as_u16()));
        }

        let mut entry: DictionaryEntry = response.json().await?;
        if entry.definition.trim().is_empty() {
            return Err(DictionaryError::NotFound(word.to_string()));
        }
        if entry.word.is_empty() {
            entry.word = word.to_string();
        }
        Ok(entry)
    }
}

/// Break "1. first 2. second" into one definition per item, keeping the
/// numbers. Text without numbering comes back as a single item.
pub fn split_definitions(text: &str) -> Vec<String> {
    let mut starts: Vec<usize> = NUMBERED_DEFINITION
        .find_iter(text)
        .map(|m| m.start())
        .collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let mut parts = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let part = text[start..end].trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }
    parts
}
