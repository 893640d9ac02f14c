//! OpenRouter API client for LLM interactions.

use crate::config::ServiceConfig;
use crate::retry::{retry_once, with_timeout, UpstreamError, DEFAULT_RETRY_DELAY};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Anything that can turn a conversation into a JSON completion.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;
    /// Request a completion constrained to a single JSON object and return
    /// its raw text.
    async fn complete_json(&self, messages: Vec<Message>) -> Result<String, UpstreamError>;
}

/// OpenRouter client for chat completions.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    retry_delay: Duration,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 16384,
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Build a client from service settings. Fails when no API key is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = config
            .openrouter_api_key
            .clone()
            .context("OPENROUTER_API_KEY environment variable not set")?;

        Ok(Self::new(api_key)
            .with_base_url(&config.openrouter_base_url)
            .with_model(&config.model)
            .with_max_tokens(config.max_tokens)
            .with_timeout(config.extraction_timeout())
            .with_retry_delay(config.retry_delay()))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<String, UpstreamError> {
        debug!("Sending request to OpenRouter: model={}", request.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(UpstreamError::Rejected(error.message));
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| UpstreamError::Rejected("completion contained no content".to_string()))?;

        if let Some(usage) = response.usage {
            info!(
                "OpenRouter response: {} tokens (prompt: {}, completion: {})",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(content)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenRouterClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete_json(&self, messages: Vec<Message>) -> Result<String, UpstreamError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            response_format: Some(ResponseFormat::JsonObject),
        };

        let client = self;
        let request = &request;
        retry_once(self.retry_delay, move || {
            with_timeout(client.timeout, client.send_request(request))
        })
        .await
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonObject,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    /// OpenRouter reports some provider failures as a 200 with an error body.
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Message types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> OpenRouterClient {
        OpenRouterClient::new("sk-test")
            .with_base_url(&server.uri())
            .with_model("test/model")
            .with_timeout(Duration::from_secs(5))
            .with_retry_delay(Duration::ZERO)
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    fn messages() -> Vec<Message> {
        vec![Message::system("extract"), Message::user("report")]
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![Message::user("hi")],
            max_tokens: None,
            response_format: Some(ResponseFormat::JsonObject),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hi"}],
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(OpenRouterClient::from_config(&ServiceConfig::default()).is_err());

        let mut config = ServiceConfig::default();
        config.openrouter_api_key = Some("sk".to_string());
        let client = OpenRouterClient::from_config(&config).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(180));
        assert_eq!(client.name(), config.model);
    }

    #[tokio::test]
    async fn test_returns_completion_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "test/model",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"a\":1}")))
            .expect(1)
            .mount(&server)
            .await;

        let content = test_client(&server).complete_json(messages()).await.unwrap();
        assert_eq!(content, "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_retries_once_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
            .mount(&server)
            .await;

        let content = test_client(&server).complete_json(messages()).await.unwrap();
        assert_eq!(content, "{}");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).complete_json(messages()).await.unwrap_err();
        assert_eq!(
            err,
            UpstreamError::Status {
                status: 401,
                body: "invalid key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_error_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": {"message": "context length exceeded", "code": 400}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).complete_json(messages()).await.unwrap_err();
        assert_eq!(err, UpstreamError::Rejected("context length exceeded".to_string()));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_after_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("{}"))
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server).with_timeout(Duration::from_millis(100));
        let err = client.complete_json(messages()).await.unwrap_err();
        assert_eq!(err, UpstreamError::Timeout(Duration::from_millis(100)));
    }
}
