//! # SilverCare Core
//!
//! Domain types, traits, and error definitions for the SilverCare companion
//! service. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! Every subsystem seam is a trait here; implementations live in their
//! respective crates, so the orchestrator can be tested with stubs and the
//! dependency graph stays pointing inward.

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, SearchError};
pub use message::{Answer, AnswerSource, Role, Turn};
pub use provider::{ChatPrompt, ChatProvider};
