mod openai;
mod prompts;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentType;
use crate::error::AnalysisError;

pub use openai::AnalysisClient;

/// Word counts for the original and the simplified text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordCount {
    pub original: usize,
    pub simplified: usize,
}

/// Outcome of one successful simplification call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Full input text, never truncated
    pub original: String,
    pub simplified: String,
    pub word_count: WordCount,
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "modelId")]
    pub model: String,
}

impl Analysis {
    pub fn new(original: String, simplified: String, model: impl Into<String>) -> Self {
        let word_count = WordCount {
            original: count_words(&original),
            simplified: count_words(&simplified),
        };

        Self {
            original,
            simplified,
            word_count,
            timestamp: Utc::now(),
            model: model.into(),
        }
    }
}

/// Number of whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Anything that can turn legal text into a plain-language analysis
#[async_trait]
pub trait Simplifier: Send + Sync {
    async fn simplify(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<Analysis, AnalysisError>;

    /// Model identifier reported in results
    fn model(&self) -> &str;
}
