//! Chat-completion provider implementations for SilverCare.
//!
//! All providers implement the `silvercare_core::ChatProvider` trait. The
//! chain tries them in fixed priority order and hands back the first
//! non-empty answer.

pub mod chain;
pub mod dashscope;
pub mod openai_compat;

pub use chain::{ChainError, ChainReply, ProviderChain, build_chain};
pub use dashscope::DashScopeProvider;
pub use openai_compat::OpenAiCompatProvider;
