//! Realtime-need detection and best-effort search augmentation.
//!
//! When a message asks about the present (weather, news, the time), the
//! orchestrator fetches a short context block from the Tavily search API and
//! splices it into the system prompt for that call only. Any failure —
//! missing key, timeout, non-2xx, unparseable body — degrades to
//! [`Augmentation::Unavailable`]: augmentation never blocks a request,
//! never retries, and never surfaces an error to the pipeline.

use async_trait::async_trait;
use serde::Deserialize;
use silvercare_core::SearchError;
use std::time::Duration;
use tracing::{debug, warn};

/// Keywords that signal a request for current information.
pub const REALTIME_KEYWORDS: &[&str] = &["天气", "今天", "新闻", "最新", "现在几点", "时间"];

/// Whether a message needs live search context before the model call.
/// False means the augmentation step is skipped entirely — no network call.
pub fn needs_realtime(message: &str) -> bool {
    REALTIME_KEYWORDS.iter().any(|kw| message.contains(kw))
}

/// Outcome of one augmentation attempt. Failure is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Augmentation {
    /// Snippets to splice into the system prompt for this call only.
    Context(String),
    /// No context available — proceed without augmentation.
    Unavailable,
}

/// The augmentation seam the orchestrator calls through.
#[async_trait]
pub trait Augmenter: Send + Sync {
    async fn augment(&self, query: &str) -> Augmentation;
}

const TAVILY_URL: &str = "https://api.tavily.com/search";
const SNIPPET_CHARS: usize = 200;

/// Tavily-backed search client.
pub struct SearchClient {
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
    client: reqwest::Client,
}

impl SearchClient {
    /// Create a client. `api_key = None` disables every outbound call.
    pub fn new(api_key: Option<String>, timeout: Duration, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            api_key,
            base_url: TAVILY_URL.into(),
            max_results,
            client,
        }
    }

    /// Override the endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_search(&self, query: &str, api_key: &str) -> Result<Option<String>, SearchError> {
        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "search_depth": "basic",
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status_code: status,
                message,
            });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

        Ok(summarize(&parsed, self.max_results))
    }
}

#[async_trait]
impl Augmenter for SearchClient {
    async fn augment(&self, query: &str) -> Augmentation {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                debug!("search not configured, skipping augmentation");
                return Augmentation::Unavailable;
            }
        };

        match self.try_search(query, api_key).await {
            Ok(Some(context)) => {
                debug!(chars = context.chars().count(), "search context attached");
                Augmentation::Context(context)
            }
            Ok(None) => Augmentation::Unavailable,
            Err(e) => {
                warn!(error = %e, "search failed, continuing without augmentation");
                Augmentation::Unavailable
            }
        }
    }
}

/// Join the first `max_results` result snippets, each truncated to
/// [`SNIPPET_CHARS`] characters. Empty results yield nothing.
fn summarize(response: &TavilyResponse, max_results: usize) -> Option<String> {
    if response.results.is_empty() {
        return None;
    }
    let snippets: Vec<String> = response
        .results
        .iter()
        .take(max_results)
        .map(|r| truncate_chars(&r.content, SNIPPET_CHARS))
        .collect();
    Some(snippets.join("\n"))
}

/// Truncate to at most `max` characters. Counted in chars, not bytes: the
/// content is mostly CJK and a byte cut would split a code point.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// --- Tavily API types (internal) ---

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    content: String,
}
