//! Conversation orchestrator — the relay flow between channel and assistant.
//!
//! Per message: gate through the rate limiter, ensure the user has a remote
//! thread, append the text, start a run, poll until a terminal status, then
//! fetch the newest assistant reply. Each inbound message is handled in its
//! own task so one user's poll wait never stalls another user's message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use relaybot_assistant::AssistantApi;
use relaybot_core::bus::queue::MessageBus;
use relaybot_core::bus::types::{InboundMessage, OutboundMessage};
use relaybot_core::ratelimit::RateLimiter;
use relaybot_core::session::SessionStore;
use relaybot_core::types::{MessageRole, RelayError, RunStatus, UserId};
use relaybot_core::utils::truncate_string;

// ─────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────

/// The relay core: consumes inbound messages, drives the remote assistant,
/// publishes replies.
pub struct Orchestrator {
    /// Message bus for inbound/outbound messages.
    bus: Arc<MessageBus>,
    /// Assistant-service client.
    client: Arc<dyn AssistantApi>,
    /// Per-user thread bookkeeping.
    sessions: Arc<SessionStore>,
    /// Per-user cooldown gate.
    limiter: Arc<RateLimiter>,
    /// Pre-provisioned assistant identifier runs are started against.
    assistant_id: String,
    /// Gap between run-status polls.
    poll_interval: Duration,
    /// Polls before the wait is abandoned, bounding how long a hung remote
    /// run can hold a user's flow.
    max_poll_attempts: u32,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(
        bus: Arc<MessageBus>,
        client: Arc<dyn AssistantApi>,
        sessions: Arc<SessionStore>,
        limiter: Arc<RateLimiter>,
        assistant_id: impl Into<String>,
        poll_interval: Duration,
        max_poll_attempts: u32,
    ) -> Self {
        let assistant_id = assistant_id.into();
        info!(
            assistant_id = %assistant_id,
            poll_interval_ms = poll_interval.as_millis() as u64,
            max_poll_attempts,
            "orchestrator initialized"
        );
        Self {
            bus,
            client,
            sessions,
            limiter,
            assistant_id,
            poll_interval,
            max_poll_attempts,
        }
    }

    /// Run the event loop: consume inbound messages and process each in its
    /// own task.
    ///
    /// Runs until the inbound channel is closed. A failure while handling
    /// one message never terminates the loop.
    pub async fn run(self: Arc<Self>) {
        info!("orchestrator started, waiting for messages");
        loop {
            match self.bus.consume_inbound().await {
                Some(msg) => {
                    let this = self.clone();
                    tokio::spawn(async move {
                        this.dispatch(msg).await;
                    });
                }
                None => {
                    info!("inbound channel closed, orchestrator exiting");
                    break;
                }
            }
        }
    }

    /// Process one inbound message and publish the reply (or an error notice).
    async fn dispatch(&self, msg: InboundMessage) {
        let reply = match self
            .handle_message(msg.user_id, &msg.content, Instant::now())
            .await
        {
            Ok(text) => text,
            Err(err) => {
                match &err {
                    RelayError::RateLimited => {
                        debug!(user_id = msg.user_id, "message rate limited")
                    }
                    RelayError::RunFailed => {
                        warn!(user_id = msg.user_id, "assistant run failed")
                    }
                    RelayError::Transient(source) => {
                        error!(user_id = msg.user_id, error = %source, "relay failure")
                    }
                }
                notice_for(&err).to_string()
            }
        };

        let outbound = OutboundMessage::new(&msg.channel, &msg.chat_id, reply);
        if let Err(e) = self.bus.publish_outbound(outbound).await {
            error!(error = %e, "failed to publish outbound message");
        }
    }

    /// The relay flow for one user message.
    ///
    /// `now` is the arrival instant used by the rate gate; the event loop
    /// passes `Instant::now()`.
    pub async fn handle_message(
        &self,
        user_id: UserId,
        text: &str,
        now: Instant,
    ) -> Result<String, RelayError> {
        if !self.limiter.allow_at(user_id, now) {
            return Err(RelayError::RateLimited);
        }

        info!(
            user_id,
            preview = %truncate_string(text, 50),
            "relaying message"
        );

        let thread_id = self.ensure_thread(user_id).await?;

        self.client
            .add_message(&thread_id, MessageRole::User, text)
            .await
            .map_err(RelayError::transient)?;

        let run_id = self
            .client
            .start_run(&thread_id, &self.assistant_id)
            .await
            .map_err(RelayError::transient)?;

        self.wait_for_run(&thread_id, &run_id).await?;

        let reply = self.latest_assistant_reply(&thread_id).await?;
        info!(user_id, thread_id = %thread_id, "reply relayed");
        Ok(reply)
    }

    /// The user's remote thread, created on first use.
    ///
    /// `insert_if_absent` keeps the mapping single-valued if two first
    /// messages race: the losing thread id is dropped unreferenced.
    async fn ensure_thread(&self, user_id: UserId) -> Result<String, RelayError> {
        if let Some(thread_id) = self.sessions.get(user_id) {
            return Ok(thread_id);
        }

        let created = self
            .client
            .create_thread()
            .await
            .map_err(RelayError::transient)?;
        info!(user_id, thread_id = %created, "created thread for user");

        Ok(self.sessions.insert_if_absent(user_id, created))
    }

    /// Poll the run until `completed`, `failed`, or the poll ceiling.
    async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<(), RelayError> {
        for attempt in 0..self.max_poll_attempts {
            let status = self
                .client
                .run_status(thread_id, run_id)
                .await
                .map_err(RelayError::transient)?;

            match status {
                RunStatus::Completed => return Ok(()),
                RunStatus::Failed => {
                    warn!(thread_id, run_id, "run reported failed");
                    return Err(RelayError::RunFailed);
                }
                status => {
                    debug!(thread_id, run_id, attempt, status = ?status, "run pending");
                }
            }

            sleep(self.poll_interval).await;
        }

        Err(RelayError::transient(anyhow!(
            "run {run_id} not terminal after {} polls",
            self.max_poll_attempts
        )))
    }

    /// The newest assistant-authored message in the thread.
    ///
    /// Selected by role rather than by list position: the listing is
    /// newest-first, but nothing guarantees the head is the assistant's
    /// reply rather than, say, the user's own message.
    async fn latest_assistant_reply(&self, thread_id: &str) -> Result<String, RelayError> {
        let messages = self
            .client
            .list_messages(thread_id)
            .await
            .map_err(RelayError::transient)?;

        messages
            .into_iter()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.text)
            .ok_or_else(|| RelayError::transient(anyhow!("no assistant reply in thread {thread_id}")))
    }
}

/// User-facing notice for each failure mode.
pub fn notice_for(err: &RelayError) -> &'static str {
    match err {
        RelayError::RateLimited => "⚠️ Please wait a moment before sending another message.",
        RelayError::RunFailed => {
            "😔 Something went wrong while generating a reply. Please try again."
        }
        RelayError::Transient(_) => {
            "😔 I couldn't process your request. Try again later, or use /reset to start a fresh conversation."
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
