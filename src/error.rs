use thiserror::Error;

/// Rejected before any extraction or network work happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No file provided")]
    NoFile,

    #[error("File size ({size_mb:.2}MB) exceeds the maximum limit of {limit_mb}MB")]
    FileTooLarge { size_mb: f64, limit_mb: f64 },

    #[error("Unsupported file type. Supported types: {supported}")]
    UnsupportedType { supported: String },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read file {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(
        "OpenAI API key is not configured. Set OPENAI_API_KEY or run 'dumbifier auth --service openai'."
    )]
    NotConfigured,

    #[error("Document text cannot be empty")]
    EmptyInput,

    #[error("OpenAI API error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("No response generated from OpenAI")]
    EmptyResponse,

    #[error("Failed to parse OpenAI response: {0}")]
    MalformedResponse(#[source] reqwest::Error),

    #[error("Failed to send request to OpenAI API: {0}")]
    Request(#[from] reqwest::Error),
}

/// Everything that can stop a processing run. Never escapes the processor:
/// it is flattened into a failed `ProcessingResult`.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to extract text from file: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("No text content found in the file")]
    EmptyDocument,

    #[error("No text provided for processing")]
    EmptyText,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Dictionary API key is not configured. Run 'dumbifier auth --service dictionary'.")]
    NotConfigured,

    #[error("Missing word")]
    EmptyWord,

    #[error("No definition found for '{0}'")]
    NotFound(String),

    #[error("Dictionary service error (HTTP {0})")]
    Upstream(u16),

    #[error("Dictionary lookup failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Not signed in. Set remote.base_url and remote.token in the config.")]
    NotAuthenticated,

    #[error("Word required")]
    EmptyWord,

    #[error("'{0}' is already saved")]
    AlreadySaved(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Server responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request to server failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode analysis: {0}")]
    Encode(#[from] serde_json::Error),
}
