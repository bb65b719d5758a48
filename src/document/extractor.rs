use async_trait::async_trait;

use super::FileInput;
use super::text;
use crate::error::ExtractionError;

/// Turns an input file into raw text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file: &FileInput) -> Result<String, ExtractionError>;
}

/// Extractor that only understands plain text. PDF and Word documents are
/// recognised but rejected with a hint to convert or paste the content.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, file: &FileInput) -> Result<String, ExtractionError> {
        let name = file.lower_name();
        let mime = file.mime_type.as_str();

        if mime == "text/plain" || name.ends_with(".txt") {
            text::read_text(&file.path, &file.name).await
        } else if mime == "application/pdf" || name.ends_with(".pdf") {
            Err(ExtractionError::UnsupportedFormat(
                "PDF parsing not implemented yet. Please convert your PDF to a text file or copy-paste the content."
                    .to_string(),
            ))
        } else if name.ends_with(".doc") || name.ends_with(".docx") {
            Err(ExtractionError::UnsupportedFormat(
                "Word document parsing not implemented yet. Please convert your document to a text file or copy-paste the content."
                    .to_string(),
            ))
        } else {
            Err(ExtractionError::UnsupportedFormat(
                "Unsupported file type. Please use .txt files or copy-paste the content."
                    .to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn input(path: PathBuf, name: &str, mime: &str) -> FileInput {
        FileInput {
            path,
            name: name.to_string(),
            size: 0,
            mime_type: mime.to_string(),
            last_modified: None,
        }
    }

    #[tokio::test]
    async fn test_extracts_txt_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tos.TXT");
        std::fs::write(&path, "We may terminate your account.").unwrap();

        let file = input(path, "tos.TXT", "application/octet-stream");
        let text = PlainTextExtractor.extract(&file).await.unwrap();
        assert_eq!(text, "We may terminate your account.");
    }

    #[tokio::test]
    async fn test_extracts_by_mime_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes");
        std::fs::write(&path, "plain").unwrap();

        let file = input(path, "notes", "text/plain");
        assert_eq!(PlainTextExtractor.extract(&file).await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn test_pdf_is_rejected_without_reading() {
        let file = input(PathBuf::from("/missing/policy.pdf"), "policy.pdf", "application/pdf");
        let err = PlainTextExtractor.extract(&file).await.unwrap_err();
        match err {
            ExtractionError::UnsupportedFormat(msg) => {
                assert!(msg.contains("PDF"));
                assert!(msg.contains("convert"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_word_documents_are_rejected() {
        for name in ["eula.doc", "eula.docx"] {
            let file = input(PathBuf::from(name), name, "application/msword");
            let err = PlainTextExtractor.extract(&file).await.unwrap_err();
            assert!(err.to_string().contains("Word document"));
        }
    }

    #[tokio::test]
    async fn test_other_types_are_rejected() {
        let file = input(PathBuf::from("page.html"), "page.html", "text/html");
        let err = PlainTextExtractor.extract(&file).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }
}
