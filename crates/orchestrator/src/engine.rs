//! The orchestration pipeline.
//!
//! Per-request order is strict: emergency interception → opportunistic TTL
//! sweep → session touch → realtime detection/augmentation → provider chain
//! → static fallback. The orchestrator is the only writer to the session
//! store, and a pair is recorded only when a provider actually answered.

use chrono::Utc;
use silvercare_core::{Answer, AnswerSource, ChatPrompt, Turn};
use silvercare_providers::ProviderChain;
use silvercare_search::{Augmentation, Augmenter};
use silvercare_session::SessionStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::emergency;
use crate::fallback;
use crate::persona::Persona;

/// Answers conversational messages. Infallible by construction: every
/// failure mode degrades to a well-formed [`Answer`].
pub struct Orchestrator {
    store: Arc<SessionStore>,
    chain: ProviderChain,
    augmenter: Arc<dyn Augmenter>,
    persona: Persona,
}

impl Orchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        chain: ProviderChain,
        augmenter: Arc<dyn Augmenter>,
        persona: Persona,
    ) -> Self {
        Self {
            store,
            chain,
            augmenter,
            persona,
        }
    }

    /// Answer one inbound message for one user.
    pub async fn handle(&self, user_id: &str, message: &str) -> Answer {
        let started = Instant::now();

        // Highest priority: safety interception, before any session or
        // network work. Must never be delayed by downstream failures.
        if let Some(answer) = emergency::intercept(message) {
            info!(
                user = %user_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Emergency response"
            );
            return answer;
        }

        let swept = self.store.sweep_expired(Utc::now()).await;
        if swept > 0 {
            info!(swept, "Expired sessions evicted");
        }

        self.store.touch_or_create(user_id).await;

        let augmentation = if silvercare_search::needs_realtime(message) {
            info!(user = %user_id, "Realtime keywords detected, querying search");
            self.augmenter.augment(message).await
        } else {
            Augmentation::Unavailable
        };

        let history = self.store.history(user_id).await;
        let prompt = ChatPrompt {
            system: self.persona.system_prompt(&augmentation),
            history,
            user_message: message.to_string(),
        };

        match self.chain.run(&prompt).await {
            Ok(reply) => {
                self.store
                    .append_exchange(user_id, Turn::user(message), Turn::assistant(&reply.text))
                    .await;
                info!(
                    user = %user_id,
                    provider = %reply.provider,
                    latency_ms = reply.latency_ms,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Chat answered"
                );
                Answer {
                    text: reply.text,
                    suggestions: reply.suggestions,
                    source: AnswerSource::Provider(reply.provider),
                }
            }
            Err(e) => {
                // The user's turn is deliberately not recorded: no real
                // reply was produced, so later prompts must not carry a
                // pair the assistant never answered.
                warn!(user = %user_id, error = %e, "Provider chain exhausted, static fallback");
                fallback::respond(message)
            }
        }
    }
}
