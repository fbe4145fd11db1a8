//! ChatProvider trait — the abstraction over chat-completion backends.
//!
//! A provider knows how to send a normalized conversation to one backend and
//! return the assistant's text. The failover chain calls `complete()` without
//! knowing which backend is behind it.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ProviderError;
use crate::message::Turn;

/// The normalized prompt every provider receives for one call.
///
/// History arrives already trimmed by the session store. The system text
/// carries the persona, the knowledge snippet, and any augmentation block
/// for this call — it is rebuilt per call and never persisted.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub history: Vec<Turn>,
    pub user_message: String,
}

impl ChatPrompt {
    /// Flatten into the message sequence sent on the wire: one system turn,
    /// the stored history, then the new user turn.
    pub fn to_turns(&self) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(self.history.len() + 2);
        turns.push(Turn::system(self.system.clone()));
        turns.extend(self.history.iter().cloned());
        turns.push(Turn::user(self.user_message.clone()));
        turns
    }
}

/// A chat-completion backend the failover chain can call.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Route name (e.g. "dashscope", "openrouter").
    fn name(&self) -> &str;

    /// Per-call completion budget. A timeout is an ordinary failure that
    /// triggers failover, never a fatal error.
    fn timeout(&self) -> Duration;

    /// Quick-reply suggestions shown alongside this provider's answers.
    fn suggestions(&self) -> Vec<String>;

    /// Send the prompt and return the assistant text.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProviderError>;

    /// Can we reach the backend? Used by `silvercare doctor`.
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}
