mod progress;
mod result;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::document::{DocumentType, FileInput, TextExtractor, classify};
use crate::error::{ProcessingError, ValidationError};
use crate::llm::Simplifier;

pub use progress::{ProcessingStep, ProgressEvent, ProgressSink, ignore_progress};
pub use result::ProcessingResult;

/// Extensions accepted for upload. Only `.txt` can actually be extracted;
/// the others pass validation and are rejected by the extractor with a hint.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".txt", ".pdf", ".doc", ".docx"];

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Runs validation, extraction, classification and analysis for one input
/// and folds every outcome into a [`ProcessingResult`].
///
/// Errors never escape: a failed run reports an `error` progress event and
/// returns a failed result.
pub struct DocumentProcessor {
    simplifier: Arc<dyn Simplifier>,
    extractor: Arc<dyn TextExtractor>,
    max_file_size: u64,
}

impl DocumentProcessor {
    pub fn new(
        simplifier: Arc<dyn Simplifier>,
        extractor: Arc<dyn TextExtractor>,
        max_file_size: u64,
    ) -> Self {
        Self {
            simplifier,
            extractor,
            max_file_size,
        }
    }

    /// Process an uploaded file
    pub async fn process_document(
        &self,
        file: Option<&FileInput>,
        on_progress: &mut ProgressSink<'_>,
    ) -> ProcessingResult {
        let mut document_type = DocumentType::Other;
        let outcome = self
            .run_document(file, &mut document_type, &mut *on_progress)
            .await;

        match outcome {
            Ok(result) => result,
            Err(e) => fail(e, document_type, on_progress),
        }
    }

    /// Process pasted text whose type the caller already knows
    pub async fn process_text(
        &self,
        text: &str,
        document_type: DocumentType,
        on_progress: &mut ProgressSink<'_>,
    ) -> ProcessingResult {
        let outcome = self.run_text(text, document_type, &mut *on_progress).await;

        match outcome {
            Ok(result) => result,
            Err(e) => fail(e, document_type, on_progress),
        }
    }

    async fn run_document(
        &self,
        file: Option<&FileInput>,
        document_type: &mut DocumentType,
        on_progress: &mut ProgressSink<'_>,
    ) -> Result<ProcessingResult, ProcessingError> {
        on_progress(ProgressEvent::new(
            ProcessingStep::Validating,
            "Validating file...",
        ));
        let file = self.validate(file)?;

        on_progress(ProgressEvent::new(
            ProcessingStep::Extracting,
            "Extracting text from file...",
        ));
        let text = self.extractor.extract(file).await?;
        if text.trim().is_empty() {
            return Err(ProcessingError::EmptyDocument);
        }
        debug!("Extracted {} characters from {}", text.len(), file.name);

        on_progress(ProgressEvent::new(
            ProcessingStep::Analyzing,
            "Analyzing document with AI...",
        ));
        *document_type = classify(&file.name, &text);
        debug!("Classified {} as {}", file.name, document_type);
        let analysis = self.simplifier.simplify(&text, *document_type).await?;

        on_progress(ProgressEvent::new(
            ProcessingStep::Formatting,
            "Formatting results...",
        ));
        let result = ProcessingResult::succeeded(analysis, *document_type, Some(file.metadata()));

        on_progress(ProgressEvent::new(
            ProcessingStep::Complete,
            "Document processing complete!",
        ));
        Ok(result)
    }

    async fn run_text(
        &self,
        text: &str,
        document_type: DocumentType,
        on_progress: &mut ProgressSink<'_>,
    ) -> Result<ProcessingResult, ProcessingError> {
        if text.trim().is_empty() {
            return Err(ProcessingError::EmptyText);
        }

        on_progress(ProgressEvent::new(
            ProcessingStep::Analyzing,
            "Analyzing text with AI...",
        ));
        let analysis = self.simplifier.simplify(text, document_type).await?;

        on_progress(ProgressEvent::new(
            ProcessingStep::Formatting,
            "Formatting results...",
        ));
        let result = ProcessingResult::succeeded(analysis, document_type, None);

        on_progress(ProgressEvent::new(
            ProcessingStep::Complete,
            "Text processing complete!",
        ));
        Ok(result)
    }

    fn validate<'a>(&self, file: Option<&'a FileInput>) -> Result<&'a FileInput, ValidationError> {
        let file = file.ok_or(ValidationError::NoFile)?;

        if file.size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size_mb: file.size as f64 / BYTES_PER_MB as f64,
                limit_mb: megabytes(self.max_file_size),
            });
        }

        let name = file.lower_name();
        if !SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            return Err(ValidationError::UnsupportedType {
                supported: SUPPORTED_EXTENSIONS.join(", "),
            });
        }

        Ok(file)
    }
}

/// Whole megabytes print without a fraction, anything else to two places
fn megabytes(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB as f64 * 100.0).round() / 100.0
}

fn fail(
    error: ProcessingError,
    document_type: DocumentType,
    on_progress: &mut ProgressSink<'_>,
) -> ProcessingResult {
    let message = error.to_string();
    warn!("Document processing error: {}", message);
    on_progress(ProgressEvent::new(ProcessingStep::Error, message.clone()));
    ProcessingResult::failed(message, document_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PlainTextExtractor;
    use crate::error::{AnalysisError, ExtractionError};
    use crate::llm::Analysis;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Returns a canned simplification and counts calls
    struct StubSimplifier {
        simplified: &'static str,
        calls: AtomicUsize,
    }

    impl StubSimplifier {
        fn new(simplified: &'static str) -> Arc<Self> {
            Arc::new(Self {
                simplified,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Simplifier for StubSimplifier {
        async fn simplify(
            &self,
            text: &str,
            _document_type: DocumentType,
        ) -> Result<Analysis, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Analysis::new(text.to_string(), self.simplified.to_string(), "stub"))
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    struct FailingSimplifier;

    #[async_trait]
    impl Simplifier for FailingSimplifier {
        async fn simplify(&self, _: &str, _: DocumentType) -> Result<Analysis, AnalysisError> {
            Err(AnalysisError::Upstream {
                status: 503,
                message: "Service unavailable".into(),
            })
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    /// Wraps the plain text extractor and counts calls
    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextExtractor for CountingExtractor {
        async fn extract(&self, file: &FileInput) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PlainTextExtractor.extract(file).await
        }
    }

    const LIMIT: u64 = 10 * 1024 * 1024;

    fn processor(simplifier: Arc<dyn Simplifier>) -> DocumentProcessor {
        DocumentProcessor::new(simplifier, Arc::new(PlainTextExtractor), LIMIT)
    }

    fn file_input(path: PathBuf, name: &str, size: u64) -> FileInput {
        FileInput {
            path,
            name: name.to_string(),
            size,
            mime_type: mime_guess::from_path(name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            last_modified: None,
        }
    }

    fn assert_invariant(result: &ProcessingResult) {
        assert_eq!(result.success(), result.analysis().is_some());
        assert_eq!(result.success(), result.error().is_none());
    }

    #[tokio::test]
    async fn test_paste_scenario() {
        let stub = StubSimplifier::new("Short.");
        let processor = processor(stub.clone());
        let mut events = Vec::new();

        let result = processor
            .process_text("This is a test.", DocumentType::Tos, &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        assert!(result.success());
        let analysis = result.analysis().unwrap();
        assert_eq!(analysis.word_count.original, 4);
        assert_eq!(analysis.word_count.simplified, 1);
        assert_eq!(result.document_type(), DocumentType::Tos);
        assert!(result.file().is_none());
        assert_eq!(stub.calls(), 1);

        let steps: Vec<_> = events.iter().map(|e| e.step).collect();
        assert_eq!(
            steps,
            vec![
                ProcessingStep::Analyzing,
                ProcessingStep::Formatting,
                ProcessingStep::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_paste_fails_without_analysis() {
        let stub = StubSimplifier::new("unused");
        let processor = processor(stub.clone());
        let mut events = Vec::new();

        let result = processor
            .process_text("   ", DocumentType::Eula, &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        assert_eq!(result.error(), Some("No text provided for processing"));
        assert_eq!(result.document_type(), DocumentType::Eula);
        assert_eq!(stub.calls(), 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].step, ProcessingStep::Error);
        assert_eq!(events[0].progress, 0);
    }

    #[tokio::test]
    async fn test_upload_runs_all_steps_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("privacy.txt");
        std::fs::write(&path, "We collect your email address.").unwrap();

        let stub = StubSimplifier::new("They keep your email.");
        let processor = processor(stub.clone());
        let file = FileInput::from_path(&path).unwrap();
        let mut events = Vec::new();

        let result = processor
            .process_document(Some(&file), &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        assert!(result.success());
        assert_eq!(result.document_type(), DocumentType::PrivacyPolicy);
        let meta = result.file().unwrap();
        assert_eq!(meta.name, "privacy.txt");
        assert_eq!(meta.mime_type, "text/plain");

        let progress: Vec<u8> = events.iter().map(|e| e.progress).collect();
        assert_eq!(progress, vec![10, 30, 60, 90, 100]);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_pdf_upload_fails_without_network_call() {
        let stub = StubSimplifier::new("unused");
        let processor = processor(stub.clone());
        let file = file_input(PathBuf::from("/nowhere/terms.pdf"), "terms.pdf", 2048);
        let mut events = Vec::new();

        let result = processor
            .process_document(Some(&file), &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        let error = result.error().unwrap();
        assert!(error.contains("PDF"));
        assert!(error.contains("convert"));
        assert_eq!(stub.calls(), 0);
        assert_eq!(events.last().unwrap().step, ProcessingStep::Error);
        assert_eq!(events.last().unwrap().progress, 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_fails_validation() {
        let stub = StubSimplifier::new("unused");
        let extractor = Arc::new(CountingExtractor::default());
        let processor = DocumentProcessor::new(stub.clone(), extractor.clone(), LIMIT);
        let file = file_input(
            PathBuf::from("/nowhere/terms.txt"),
            "terms.txt",
            11 * 1024 * 1024,
        );
        let mut events = Vec::new();

        let result = processor
            .process_document(Some(&file), &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        let error = result.error().unwrap();
        assert!(error.contains("10MB"));
        assert!(error.contains("11.00MB"));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(stub.calls(), 0);

        let steps: Vec<_> = events.iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![ProcessingStep::Validating, ProcessingStep::Error]);
    }

    #[tokio::test]
    async fn test_sub_megabyte_limit_is_reported() {
        let stub = StubSimplifier::new("unused");
        let processor = DocumentProcessor::new(
            stub.clone(),
            Arc::new(CountingExtractor::default()),
            512 * 1024,
        );
        let file = file_input(PathBuf::from("/nowhere/terms.txt"), "terms.txt", 600 * 1024);

        let result = processor.process_document(Some(&file), &mut ignore_progress).await;

        assert_eq!(
            result.error(),
            Some("File size (0.59MB) exceeds the maximum limit of 0.5MB")
        );
        assert_eq!(megabytes(10 * 1024 * 1024), 10.0);
        assert_eq!(megabytes(1_000_000), 0.95);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let processor = processor(StubSimplifier::new("unused"));
        let result = processor.process_document(None, &mut ignore_progress).await;
        assert_invariant(&result);
        assert_eq!(result.error(), Some("No file provided"));
        assert_eq!(result.document_type(), DocumentType::Other);
    }

    #[tokio::test]
    async fn test_unsupported_extension_lists_types() {
        let processor = processor(StubSimplifier::new("unused"));
        let file = file_input(PathBuf::from("/nowhere/terms.rtf"), "terms.rtf", 10);
        let result = processor
            .process_document(Some(&file), &mut ignore_progress)
            .await;
        assert_eq!(
            result.error(),
            Some("Unsupported file type. Supported types: .txt, .pdf, .doc, .docx")
        );
    }

    #[tokio::test]
    async fn test_whitespace_only_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, " \n\t ").unwrap();

        let stub = StubSimplifier::new("unused");
        let processor = processor(stub.clone());
        let file = FileInput::from_path(&path).unwrap();
        let result = processor
            .process_document(Some(&file), &mut ignore_progress)
            .await;

        assert_eq!(result.error(), Some("No text content found in the file"));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_is_contained() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eula.txt");
        std::fs::write(&path, "Software license terms.").unwrap();

        let processor = processor(Arc::new(FailingSimplifier));
        let file = FileInput::from_path(&path).unwrap();
        let mut events = Vec::new();
        let result = processor
            .process_document(Some(&file), &mut |e| events.push(e))
            .await;

        assert_invariant(&result);
        assert_eq!(
            result.error(),
            Some("OpenAI API error: 503 - Service unavailable")
        );
        assert_eq!(result.document_type(), DocumentType::Eula);

        let steps: Vec<_> = events.iter().map(|e| e.step).collect();
        assert_eq!(
            steps,
            vec![
                ProcessingStep::Validating,
                ProcessingStep::Extracting,
                ProcessingStep::Analyzing,
                ProcessingStep::Error
            ]
        );
    }
}
