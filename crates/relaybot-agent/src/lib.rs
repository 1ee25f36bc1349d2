//! Relaybot Agent — the conversation orchestrator.
//!
//! This crate contains the per-message relay flow: rate gate → session →
//! append message → start run → poll until terminal → fetch reply.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
