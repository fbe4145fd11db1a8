//! Conversation domain types.
//!
//! A `Turn` is one message in a conversation. An `Answer` is what the
//! orchestrator hands back to the caller: reply text plus quick-reply
//! suggestions, tagged with where it came from.

use serde::{Deserialize, Serialize};

/// The role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant's reply
    Assistant,
    /// Persona + knowledge + augmentation. Never stored in a session.
    System,
}

impl Role {
    /// Wire name used by every provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Where an answer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSource {
    /// Emergency interception — produced before any session or network work.
    Emergency,
    /// A provider in the failover chain, by route name.
    Provider(String),
    /// The static fallback responder — every provider failed or none configured.
    Fallback,
}

/// The orchestrator's reply to one inbound message.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub suggestions: Vec<String>,
    pub source: AnswerSource,
}
