//! Configuration schema.
//!
//! Hierarchy: `Config` → `TelegramConfig`, `AssistantConfig`, `LimitsConfig`,
//! `LoggingConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! `#[serde(rename_all = "camelCase")]` handles the conversion.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.relaybot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub assistant: AssistantConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Check that every credential the gateway needs is present.
    ///
    /// A missing bot token, API key, or assistant id is a bootstrap failure:
    /// the process must abort at startup rather than fail per-message.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut missing = Vec::new();
        if self.telegram.token.is_empty() {
            missing.push("telegram.token (or TELEGRAM_BOT_TOKEN)");
        }
        if self.assistant.api_key.is_empty() {
            missing.push("assistant.apiKey (or OPENAI_API_KEY)");
        }
        if self.assistant.assistant_id.is_empty() {
            missing.push("assistant.assistantId (or ASSISTANT_ID)");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("missing required configuration: {}", missing.join(", "))
        }
    }
}

// ─────────────────────────────────────────────
// Telegram
// ─────────────────────────────────────────────

/// Telegram channel settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: String,
    /// Allow-list of user ids or usernames. Empty = allow everyone.
    pub allowed_users: Vec<String>,
}

// ─────────────────────────────────────────────
// Assistant service
// ─────────────────────────────────────────────

/// Remote assistant-service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides the service default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Pre-provisioned assistant identifier runs are started against.
    pub assistant_id: String,
    /// How often a run's status is polled, in milliseconds.
    pub poll_interval_ms: u64,
    /// How many polls before the wait is abandoned.
    pub max_poll_attempts: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            assistant_id: String::new(),
            poll_interval_ms: 500,
            max_poll_attempts: 240,
        }
    }
}

impl AssistantConfig {
    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ─────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────

/// Per-user throttling settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitsConfig {
    /// Minimum gap between two accepted messages from one user, in ms.
    pub cooldown_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { cooldown_ms: 1000 }
    }
}

impl LimitsConfig {
    /// Cooldown as a `Duration`.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

/// Logging settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Path of the append-only log file. `None` uses
    /// `~/.relaybot/relaybot.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
