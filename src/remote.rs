use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RemoteConfig;
use crate::document::FileInput;
use crate::error::RemoteError;
use crate::llm::Analysis;
use crate::processor::ProcessingResult;

/// A document record as stored by the server
#[derive(Debug, Clone, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    pub word: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct TextDocumentRequest<'a> {
    filename: &'a str,
    text: &'a str,
    analysis: Option<&'a Analysis>,
}

#[derive(Serialize)]
struct WordRequest<'a> {
    word: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Client for the account-backed document and saved-word API
pub struct RemoteClient {
    client: Client,
    base_url: String,
    token: String,
}

impl RemoteClient {
    /// Fails with `NotAuthenticated` unless both a server and a token are set
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        if !config.is_authenticated() {
            return Err(RemoteError::NotAuthenticated);
        }
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::new(),
            base_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store pasted text with its analysis
    pub async fn save_text(
        &self,
        filename: &str,
        text: &str,
        analysis: Option<&Analysis>,
    ) -> Result<StoredDocument, RemoteError> {
        let body = TextDocumentRequest {
            filename,
            text,
            analysis,
        };
        let request = self
            .client
            .post(format!("{}/documents/text", self.base_url))
            .json(&body);

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Upload the original file along with the extracted text and analysis
    pub async fn save_upload(
        &self,
        file: &FileInput,
        extracted_text: &str,
        analysis: Option<&Analysis>,
    ) -> Result<StoredDocument, RemoteError> {
        let bytes = tokio::fs::read(&file.path).await?;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;

        let mut form = Form::new()
            .part("file", part)
            .text("extractedText", extracted_text.to_string());
        if let Some(analysis) = analysis {
            form = form.text("analysis", serde_json::to_string(analysis)?);
        }

        let request = self
            .client
            .post(format!("{}/documents/upload", self.base_url))
            .multipart(form);

        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Saved words, newest first
    pub async fn list_words(&self) -> Result<Vec<SavedWord>, RemoteError> {
        let request = self.client.get(format!("{}/saved-words", self.base_url));
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    pub async fn add_word(&self, word: &str) -> Result<SavedWord, RemoteError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(RemoteError::EmptyWord);
        }

        let request = self
            .client
            .post(format!("{}/saved-words", self.base_url))
            .json(&WordRequest { word });

        match self.send(request).await {
            Ok(response) => Ok(response.json().await?),
            Err(RemoteError::Status { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Err(RemoteError::AlreadySaved(word.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn remove_word(&self, word: &str) -> Result<(), RemoteError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(RemoteError::EmptyWord);
        }

        let request = self.client.delete(self.word_url(word)?);
        self.send(request).await?;
        Ok(())
    }

    fn word_url(&self, word: &str) -> Result<Url, RemoteError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["saved-words", word]);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(RemoteError::Status { status, message })
    }
}

/// Mirror a result to the server after it was saved locally.
///
/// Only successful results are sent. Failures are logged and dropped so
/// the local save always stands on its own; the return value only says
/// whether the server accepted the document.
pub async fn persist_best_effort(
    client: &RemoteClient,
    result: &ProcessingResult,
    upload: Option<&FileInput>,
) -> bool {
    let Some(analysis) = result.analysis() else {
        return false;
    };

    let outcome = match upload {
        Some(file) => client.save_upload(file, &analysis.original, Some(analysis)).await,
        None => client.save_text("Pasted Text", &analysis.original, Some(analysis)).await,
    };

    match outcome {
        Ok(doc) => {
            info!(
                "Saved document {} ({}) to {}",
                doc.id,
                doc.filename,
                client.base_url()
            );
            true
        }
        Err(e) => {
            warn!("Failed to save document to server: {}", e);
            false
        }
    }
}
