//! Core types for Relaybot — identifiers, assistant wire types, and the
//! error taxonomy shared across crates.
//!
//! The remote assistant service models a conversation as a *thread* holding
//! messages, and reply generation as an asynchronous *run* that is polled
//! until it reaches a terminal status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform-assigned user identifier (Telegram user id).
pub type UserId = i64;

// ─────────────────────────────────────────────
// Assistant wire types
// ─────────────────────────────────────────────

/// Role of a message inside a remote thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Status of a remote run.
///
/// Only `completed` and `failed` are terminal for the orchestrator; every
/// other status (including ones this crate has never heard of) means the run
/// is still worth polling.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    /// Any status string not listed above (e.g. `requires_action`, `expired`).
    Other(String),
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            _ => RunStatus::Other(s),
        }
    }
}

impl RunStatus {
    /// Whether the run has finished (successfully or not).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// A message inside a remote thread, flattened to the parts the bot uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadMessage {
    /// Remote message id.
    pub id: String,
    /// Who authored the message.
    pub role: MessageRole,
    /// Concatenated text content.
    pub text: String,
}

impl ThreadMessage {
    pub fn new(id: impl Into<String>, role: MessageRole, text: impl Into<String>) -> Self {
        ThreadMessage {
            id: id.into(),
            role,
            text: text.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Error taxonomy
// ─────────────────────────────────────────────

/// Per-message failure modes of the relay flow.
///
/// Each variant maps to a distinct user-facing notice.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The user sent messages faster than the cooldown allows. No state was
    /// changed and no remote calls were made.
    #[error("message rejected by rate limiter")]
    RateLimited,

    /// The remote run ended in the `failed` status. The session is left
    /// intact so the user can retry in the same context.
    #[error("assistant run ended in a failed state")]
    RunFailed,

    /// Any remote-call failure: network, auth, malformed response, or a run
    /// that never reached a terminal status within the poll ceiling.
    #[error(transparent)]
    Transient(#[from] anyhow::Error),
}

impl RelayError {
    /// Wrap any error source as a transient failure.
    pub fn transient(err: impl Into<anyhow::Error>) -> Self {
        RelayError::Transient(err.into())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
