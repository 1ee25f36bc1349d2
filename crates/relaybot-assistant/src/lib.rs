//! Assistant-service client layer for Relaybot.
//!
//! # Architecture
//!
//! - [`traits::AssistantApi`] — the remote-conversation abstraction the
//!   orchestrator depends on (create thread, append message, start run,
//!   poll run, list messages)
//! - [`http_client::HttpAssistantClient`] — reqwest implementation against
//!   an OpenAI Assistants-compatible HTTP API

pub mod http_client;
pub mod traits;

// Re-export main types for convenience
pub use http_client::HttpAssistantClient;
pub use traits::{AssistantApi, AssistantError};
