//! OpenAI-compatible provider.
//!
//! Works with OpenRouter and any endpoint exposing `/chat/completions`.
//! Route B uses this against OpenRouter's free tier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use silvercare_core::error::ProviderError;
use silvercare_core::provider::{ChatPrompt, ChatProvider};
use std::time::Duration;
use tracing::{debug, warn};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENROUTER_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// An OpenAI-compatible chat-completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    suggestions: Vec<String>,
    extra_headers: Vec<(String, String)>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            suggestions: Vec::new(),
            extra_headers: Vec::new(),
            client,
        }
    }

    /// Create an OpenRouter provider (convenience constructor).
    ///
    /// Sends the attribution headers OpenRouter uses for free-tier ranking.
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", OPENROUTER_BASE_URL, api_key, OPENROUTER_MODEL)
            .with_header("HTTP-Referer", "https://silvercare.demo")
            .with_header("X-Title", "SilverCare-Elderly-Assistant")
            .with_suggestions(vec!["长护险怎么查？".into(), "助餐点几点开？".into()])
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    fn to_api_messages(prompt: &ChatPrompt) -> Vec<ApiMessage> {
        prompt
            .to_turns()
            .into_iter()
            .map(|turn| ApiMessage {
                role: turn.role.as_str().into(),
                content: turn.content,
            })
            .collect()
    }

    fn text_from(response: ApiResponse) -> Result<String, ProviderError> {
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn suggestions(&self) -> Vec<String> {
        self.suggestions.clone()
    }

    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(prompt),
        });

        debug!(provider = %self.name, model = %self.model, "Sending completion request");

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        for (name, value) in &self.extra_headers {
            request = request.header(name, value);
        }

        let response = request.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::text_from(api_response)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
