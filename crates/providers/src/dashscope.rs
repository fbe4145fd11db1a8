//! Aliyun DashScope provider — route A.
//!
//! Uses the native Generation API, not the OpenAI-compatible surface:
//! `POST /api/v1/services/aigc/text-generation/generation` with the message
//! list under `input.messages` and `result_format: "message"` so the reply
//! comes back as a chat message rather than raw text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use silvercare_core::error::ProviderError;
use silvercare_core::provider::{ChatPrompt, ChatProvider};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com";
const DEFAULT_MODEL: &str = "qwen-max";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Aliyun DashScope text-generation provider.
pub struct DashScopeProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    suggestions: Vec<String>,
    client: reqwest::Client,
}

impl DashScopeProvider {
    /// Create a new DashScope provider with the default model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "dashscope".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            suggestions: vec![
                "申请补贴要什么材料？".into(),
                "帮我查查最近的助餐点".into(),
                "老人家该多吃什么？".into(),
            ],
            client,
        }
    }

    /// Create with a custom base URL (tests, proxies).
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

    /// Pull the assistant text out of a parsed response; empty text is a
    /// failure, not a success with nothing to say.
    fn text_from(response: GenerationResponse) -> Result<String, ProviderError> {
        let text = response
            .output
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatProvider for DashScopeProvider {
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
        let url = format!(
            "{}/api/v1/services/aigc/text-generation/generation",
            self.base_url
        );

        let body = serde_json::json!({
            "model": self.model,
            "input": { "messages": Self::to_api_messages(prompt) },
            "parameters": { "result_format": "message" },
        });

        debug!(provider = %self.name, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
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
            warn!(status, body = %error_body, "DashScope returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: GenerationResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        debug!(provider = %self.name, request_id = %api_response.request_id, "Completion received");
        Self::text_from(api_response)
    }
}

// --- DashScope API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: GenerationOutput,
    #[serde(default)]
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    choices: Vec<GenerationChoice>,
}

#[derive(Debug, Deserialize)]
struct GenerationChoice {
    message: GenerationMessage,
}

#[derive(Debug, Deserialize)]
struct GenerationMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_defaults() {
        let provider = DashScopeProvider::new("sk-test");
        assert_eq!(provider.name(), "dashscope");
        assert_eq!(provider.model, "qwen-max");
        assert!(provider.base_url.contains("dashscope.aliyuncs.com"));
        assert_eq!(provider.timeout(), Duration::from_secs(60));
        assert_eq!(provider.suggestions().len(), 3);
    }

    #[test]
    fn builder_overrides() {
        let provider = DashScopeProvider::new("sk-test")
            .with_base_url("http://localhost:9999/")
            .with_model("qwen-plus")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(provider.base_url, "http://localhost:9999");
        assert_eq!(provider.model, "qwen-plus");
        assert_eq!(provider.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn message_conversion_order() {
        let prompt = ChatPrompt {
            system: "persona".into(),
            history: vec![
                silvercare_core::Turn::user("早上好"),
                silvercare_core::Turn::assistant("早上好呀"),
            ],
            user_message: "今天吃什么".into(),
        };
        let messages = DashScopeProvider::to_api_messages(&prompt);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "今天吃什么");
    }

    #[test]
    fn parse_generation_response() {
        let data = r#"{
            "output": {
                "choices": [
                    {"message": {"role": "assistant", "content": "您好呀，老人家！"}}
                ]
            },
            "request_id": "abc-123",
            "usage": {"input_tokens": 10, "output_tokens": 8}
        }"#;
        let parsed: GenerationResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.request_id, "abc-123");
        let text = DashScopeProvider::text_from(parsed).unwrap();
        assert_eq!(text, "您好呀，老人家！");
    }

    #[test]
    fn empty_content_is_a_failure() {
        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"output":{"choices":[{"message":{"content":"  "}}]}}"#)
                .unwrap();
        assert!(matches!(
            DashScopeProvider::text_from(parsed),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn missing_choices_is_a_failure() {
        let parsed: GenerationResponse =
            serde_json::from_str(r#"{"output":{"choices":[]}}"#).unwrap();
        assert!(matches!(
            DashScopeProvider::text_from(parsed),
            Err(ProviderError::EmptyResponse)
        ));
    }
}
