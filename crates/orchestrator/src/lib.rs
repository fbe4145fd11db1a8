//! The SilverCare conversation pipeline.
//!
//! One inbound message flows through, in strict order: emergency
//! interception → session sweep/touch → realtime augmentation → the provider
//! failover chain → the static fallback. The pipeline owns all session
//! mutation and is infallible: every failure mode degrades to a well-formed
//! answer.

pub mod emergency;
pub mod engine;
pub mod fallback;
pub mod persona;

pub use engine::Orchestrator;
pub use persona::Persona;
