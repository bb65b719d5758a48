use std::path::Path;

use crate::error::ExtractionError;

/// Read a plain text file, rejecting content that is not valid UTF-8
pub async fn read_text(path: &Path, name: &str) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Read {
            name: name.to_string(),
            source,
        })?;

    String::from_utf8(bytes).map_err(|e| ExtractionError::Read {
        name: name.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}
