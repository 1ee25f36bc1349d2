//! HTTP client for an OpenAI Assistants-compatible threads/runs API.
//!
//! Endpoints used:
//! - `POST /threads` — create a conversation thread
//! - `POST /threads/{id}/messages` — append a message
//! - `POST /threads/{id}/runs` — start a run
//! - `GET  /threads/{id}/runs/{run_id}` — poll run status
//! - `GET  /threads/{id}/messages?order=desc` — list messages, newest first
//!
//! Every request carries bearer auth and the `OpenAI-Beta: assistants=v2`
//! header. The base URL is configurable so tests can point at a mock server.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use relaybot_core::types::{MessageRole, RunStatus, ThreadMessage};

use crate::traits::{AssistantApi, AssistantError};

/// Default API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Value of the `OpenAI-Beta` header required by the threads/runs API.
const ASSISTANTS_BETA: &str = "assistants=v2";

/// Page size when listing thread messages.
const LIST_LIMIT: u8 = 10;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ObjectId {
    id: String,
}

#[derive(Deserialize)]
struct RunObject {
    status: RunStatus,
}

#[derive(Serialize)]
struct CreateMessageBody<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Serialize)]
struct CreateRunBody<'a> {
    assistant_id: &'a str,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    id: String,
    role: MessageRole,
    content: Vec<ContentBlock>,
}

/// One content block of a thread message. Only text blocks carry a reply;
/// anything else (images, file references) is skipped.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

impl From<MessageObject> for ThreadMessage {
    fn from(msg: MessageObject) -> Self {
        let text: Vec<String> = msg
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.value),
                ContentBlock::Unsupported => None,
            })
            .collect();
        ThreadMessage {
            id: msg.id,
            role: msg.role,
            text: text.join("\n"),
        }
    }
}

// ─────────────────────────────────────────────
// HttpAssistantClient
// ─────────────────────────────────────────────

/// Assistant-service client over HTTP.
pub struct HttpAssistantClient {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
}

impl std::fmt::Debug for HttpAssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssistantClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl HttpAssistantClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_key`  — bearer token for the service
    /// * `api_base` — base URL override; `None` uses the public endpoint
    pub fn new(api_key: impl Into<String>, api_base: Option<String>) -> Self {
        let api_base = api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        HttpAssistantClient {
            client,
            api_base,
            api_key: api_key.into(),
        }
    }

    /// Build a full endpoint URL.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Send a request with auth + beta headers and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, AssistantError> {
        let response = req
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssistantApi for HttpAssistantClient {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        let url = self.url("threads");
        let thread: ObjectId = self
            .send(self.client.post(&url).json(&serde_json::json!({})))
            .await?;
        debug!(thread_id = %thread.id, "thread created");
        Ok(thread.id)
    }

    async fn add_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<String, AssistantError> {
        let url = self.url(&format!("threads/{thread_id}/messages"));
        let body = CreateMessageBody {
            role,
            content: text,
        };
        let message: ObjectId = self.send(self.client.post(&url).json(&body)).await?;
        debug!(thread_id, message_id = %message.id, "message appended");
        Ok(message.id)
    }

    async fn start_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<String, AssistantError> {
        let url = self.url(&format!("threads/{thread_id}/runs"));
        let body = CreateRunBody { assistant_id };
        let run: ObjectId = self.send(self.client.post(&url).json(&body)).await?;
        debug!(thread_id, run_id = %run.id, "run started");
        Ok(run.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError> {
        let url = self.url(&format!("threads/{thread_id}/runs/{run_id}"));
        let run: RunObject = self.send(self.client.get(&url)).await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError> {
        let url = self.url(&format!("threads/{thread_id}/messages"));
        let limit = LIST_LIMIT.to_string();
        let list: MessageList = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("order", "desc"), ("limit", limit.as_str())]),
            )
            .await?;
        Ok(list.data.into_iter().map(ThreadMessage::from).collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
