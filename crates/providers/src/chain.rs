//! Provider failover chain — ordered attempts with per-provider timeouts.
//!
//! Route priority is fixed at startup by configuration; there is no
//! load- or latency-based reordering. Every provider receives the identical
//! normalized prompt. A timeout, transport error, non-2xx, or empty reply
//! all mean the same thing: log it and try the next route. The chain never
//! touches the session store — recording the exchange is the caller's job,
//! and only happens on success.

use silvercare_config::AppConfig;
use silvercare_core::error::ProviderError;
use silvercare_core::provider::{ChatPrompt, ChatProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::dashscope::DashScopeProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// A successful chain run: which route answered, with what, how fast.
#[derive(Debug, Clone)]
pub struct ChainReply {
    pub provider: String,
    pub text: String,
    pub suggestions: Vec<String>,
    pub latency_ms: u64,
}

/// Every configured route failed (or none was configured).
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("all {attempts} configured provider route(s) failed")]
    Exhausted { attempts: usize },
}

/// An ordered list of providers processed by one uniform failover loop.
pub struct ProviderChain {
    entries: Vec<Arc<dyn ChatProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a provider at the end of the priority order.
    pub fn add(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.entries.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The providers in priority order (for `doctor` probes).
    pub fn providers(&self) -> &[Arc<dyn ChatProvider>] {
        &self.entries
    }

    /// Try each provider in priority order; the first non-empty answer wins.
    pub async fn run(&self, prompt: &ChatPrompt) -> Result<ChainReply, ChainError> {
        for (i, provider) in self.entries.iter().enumerate() {
            let name = provider.name().to_string();
            info!(
                provider = %name,
                attempt = i + 1,
                total = self.entries.len(),
                "Trying provider"
            );

            let started = Instant::now();
            let outcome =
                tokio::time::timeout(provider.timeout(), provider.complete(prompt)).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    info!(provider = %name, latency_ms, "Provider answered");
                    return Ok(ChainReply {
                        provider: name,
                        text,
                        suggestions: provider.suggestions(),
                        latency_ms,
                    });
                }
                Ok(Ok(_)) => {
                    warn!(
                        provider = %name,
                        latency_ms,
                        error = %ProviderError::EmptyResponse,
                        "Provider failed, trying next"
                    );
                }
                Ok(Err(e)) => {
                    warn!(provider = %name, latency_ms, error = %e, "Provider failed, trying next");
                }
                Err(_) => {
                    warn!(
                        provider = %name,
                        timeout_secs = provider.timeout().as_secs(),
                        "Provider timed out, trying next"
                    );
                }
            }
        }

        Err(ChainError::Exhausted {
            attempts: self.entries.len(),
        })
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the chain from configuration. Credential presence decides which
/// routes are registered; the order is fixed: DashScope, then OpenRouter.
pub fn build_chain(config: &AppConfig) -> ProviderChain {
    let mut chain = ProviderChain::new();

    if let Some(key) = &config.providers.dashscope.api_key {
        let mut provider = DashScopeProvider::new(key);
        if let Some(url) = &config.providers.dashscope.api_url {
            provider = provider.with_base_url(url);
        }
        if let Some(model) = &config.providers.dashscope.model {
            provider = provider.with_model(model);
        }
        if let Some(secs) = config.providers.dashscope.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs));
        }
        chain = chain.add(Arc::new(provider));
    }

    if let Some(key) = &config.providers.openrouter.api_key {
        let mut provider = OpenAiCompatProvider::openrouter(key);
        if let Some(url) = &config.providers.openrouter.api_url {
            provider = provider.with_base_url(url);
        }
        if let Some(model) = &config.providers.openrouter.model {
            provider = provider.with_model(model);
        }
        if let Some(secs) = config.providers.openrouter.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs));
        }
        chain = chain.add(Arc::new(provider));
    }

    if chain.is_empty() {
        warn!("No provider credentials configured — every request will get a static fallback answer");
    }

    chain
}
