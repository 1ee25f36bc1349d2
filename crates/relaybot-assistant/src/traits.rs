//! Assistant API trait — the remote-conversation abstraction.
//!
//! The orchestrator only ever talks to this trait, so tests substitute a
//! scripted stub and the gateway plugs in [`crate::HttpAssistantClient`].

use async_trait::async_trait;
use thiserror::Error;

use relaybot_core::types::{MessageRole, RunStatus, ThreadMessage};

/// Failures surfaced by an assistant-service client.
///
/// None of these are retried anywhere in the relay flow.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("assistant api returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered 2xx but the body didn't match the wire format.
    #[error("malformed assistant response: {0}")]
    Decode(String),
}

/// Remote conversation operations used by the orchestrator.
///
/// One *thread* holds the conversation; a *run* is the asynchronous job that
/// produces the assistant's next reply within it.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create a fresh, empty conversation thread. Returns its id.
    async fn create_thread(&self) -> Result<String, AssistantError>;

    /// Append a message to a thread. Returns the created message id.
    async fn add_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<String, AssistantError>;

    /// Start a run on a thread against the given assistant. Returns the run id.
    async fn start_run(&self, thread_id: &str, assistant_id: &str)
        -> Result<String, AssistantError>;

    /// Fetch the current status of a run.
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError>;

    /// List a thread's messages, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError>;
}
