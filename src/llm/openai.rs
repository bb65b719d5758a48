use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts::{SIMPLIFICATION_SYSTEM_PROMPT, limit_text_size, simplification_prompt};
use super::{Analysis, Simplifier};
use crate::config::{DEFAULT_OPENAI_BASE_URL, OpenAiConfig};
use crate::document::DocumentType;
use crate::error::AnalysisError;

/// Simplifier backed by an OpenAI-compatible chat completions endpoint.
///
/// Sends exactly one request per call and never retries.
pub struct AnalysisClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f64,
    max_chars: usize,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl AnalysisClient {
    pub fn new(config: &OpenAiConfig, max_chars: usize) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_chars,
        }
    }

    /// Override the configured model
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model {
            self.model = model.to_string();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(&self, prompt: String) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SIMPLIFICATION_SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AnalysisError::Upstream { status, message });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(AnalysisError::MalformedResponse)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AnalysisError::EmptyResponse)
    }
}

#[async_trait]
impl Simplifier for AnalysisClient {
    async fn simplify(
        &self,
        text: &str,
        document_type: DocumentType,
    ) -> Result<Analysis, AnalysisError> {
        if !self.is_configured() {
            return Err(AnalysisError::NotConfigured);
        }
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let limited = limit_text_size(text, self.max_chars);
        debug!(
            "Simplifying {} document ({} chars, {} sent)",
            document_type,
            text.chars().count(),
            limited.chars().count()
        );

        let prompt = simplification_prompt(&limited, document_type);
        let simplified = self.complete(prompt).await?;

        Ok(Analysis::new(text.to_string(), simplified, &self.model))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config(api_key: &str, base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: Some(base_url.to_string()),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1500,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn test_simplify_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gpt-4o-mini",
                    "max_tokens": 1500,
                    "temperature": 0.3
                })),
                Matcher::Regex("legal expert".to_string()),
                Matcher::Regex("following TOS document".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "Short."}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = AnalysisClient::new(&config("sk-test", &server.url()), 3000);
        let analysis = client
            .simplify("This is a test.", DocumentType::Tos)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(analysis.original, "This is a test.");
        assert_eq!(analysis.simplified, "Short.");
        assert_eq!(analysis.word_count.original, 4);
        assert_eq!(analysis.word_count.simplified, 1);
        assert_eq!(analysis.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_original_is_kept_untruncated() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "ok"}}]}).to_string())
            .create_async()
            .await;

        let long = "word ".repeat(2000);
        let client = AnalysisClient::new(&config("sk-test", &server.url()), 100);
        let analysis = client.simplify(&long, DocumentType::Eula).await.unwrap();
        assert_eq!(analysis.original, long);
        assert_eq!(analysis.word_count.original, 2000);
    }

    #[tokio::test]
    async fn test_upstream_error_includes_status_and_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(json!({"error": {"message": "Incorrect API key provided"}}).to_string())
            .create_async()
            .await;

        let client = AnalysisClient::new(&config("sk-bad", &server.url()), 3000);
        let err = client
            .simplify("Some terms.", DocumentType::Tos)
            .await
            .unwrap_err();
        match err {
            AnalysisError::Upstream { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_without_json_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let client = AnalysisClient::new(&config("sk-test", &server.url()), 3000);
        let err = client
            .simplify("Some terms.", DocumentType::Tos)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API error: 500 - Unknown error");
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let client = AnalysisClient::new(&config("sk-test", &server.url()), 3000);
        let err = client
            .simplify("Some terms.", DocumentType::Tos)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_not_configured_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let client = AnalysisClient::new(&config("", &server.url()), 3000);
        assert!(!client.is_configured());
        let err = client
            .simplify("Some terms.", DocumentType::Tos)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NotConfigured));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let client = AnalysisClient::new(&config("sk-test", "http://127.0.0.1:9"), 3000);
        let err = client.simplify("   \n ", DocumentType::Tos).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput));
    }

    #[test]
    fn test_model_override() {
        let client = AnalysisClient::new(&config("k", "http://localhost/v1/"), 3000)
            .with_model(Some("gpt-4o"));
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.base_url, "http://localhost/v1");
    }
}
