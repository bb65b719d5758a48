use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::{DocumentType, FileMetadata};
use crate::llm::Analysis;

/// Normalized outcome of a processing run.
///
/// Only built through [`ProcessingResult::succeeded`] and
/// [`ProcessingResult::failed`], so `analysis` is present exactly when the
/// run succeeded and `error` exactly when it did not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FileMetadata>,
    document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    processed_at: DateTime<Utc>,
}

impl ProcessingResult {
    pub fn succeeded(
        analysis: Analysis,
        document_type: DocumentType,
        file: Option<FileMetadata>,
    ) -> Self {
        Self {
            success: true,
            file,
            document_type,
            analysis: Some(analysis),
            error: None,
            processed_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>, document_type: DocumentType) -> Self {
        Self {
            success: false,
            file: None,
            document_type,
            analysis: None,
            error: Some(error.into()),
            processed_at: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn file(&self) -> Option<&FileMetadata> {
        self.file.as_ref()
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_has_analysis_only() {
        let analysis = Analysis::new("a b".into(), "c".into(), "m");
        let result = ProcessingResult::succeeded(analysis, DocumentType::Eula, None);
        assert!(result.success());
        assert!(result.analysis().is_some());
        assert!(result.error().is_none());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["documentType"], "eula");
        assert!(value.get("error").is_none());
        assert!(value.get("file").is_none());
        assert!(value["processedAt"].is_string());
    }

    #[test]
    fn test_failed_has_error_only() {
        let result = ProcessingResult::failed("boom", DocumentType::Other);
        assert!(!result.success());
        assert!(result.analysis().is_none());
        assert_eq!(result.error(), Some("boom"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("analysis").is_none());
    }
}
