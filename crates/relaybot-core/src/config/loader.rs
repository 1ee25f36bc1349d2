//! Config loader — reads `~/.relaybot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.relaybot/config.json`
//! 3. Environment variables `RELAYBOT_<SECTION>__<FIELD>` (override JSON)
//! 4. Conventional short names (`TELEGRAM_BOT_TOKEN`, `OPENAI_API_KEY`,
//!    `ASSISTANT_ID`) as fallbacks for still-empty credentials

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `RELAYBOT_<SECTION>__<FIELD>` (double underscore as
/// delimiter). The conventional short names are honored afterwards, but only
/// where the value is still empty.
fn apply_env_overrides(mut config: Config) -> Config {
    // Telegram
    if let Ok(val) = std::env::var("RELAYBOT_TELEGRAM__TOKEN") {
        config.telegram.token = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_TELEGRAM__ALLOWED_USERS") {
        config.telegram.allowed_users = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    // Assistant service
    if let Ok(val) = std::env::var("RELAYBOT_ASSISTANT__API_KEY") {
        config.assistant.api_key = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_ASSISTANT__API_BASE") {
        config.assistant.api_base = Some(val);
    }
    if let Ok(val) = std::env::var("RELAYBOT_ASSISTANT__ASSISTANT_ID") {
        config.assistant.assistant_id = val;
    }
    if let Ok(val) = std::env::var("RELAYBOT_ASSISTANT__POLL_INTERVAL_MS") {
        if let Ok(n) = val.parse::<u64>() {
            config.assistant.poll_interval_ms = n;
        }
    }
    if let Ok(val) = std::env::var("RELAYBOT_ASSISTANT__MAX_POLL_ATTEMPTS") {
        if let Ok(n) = val.parse::<u32>() {
            config.assistant.max_poll_attempts = n;
        }
    }

    // Limits
    if let Ok(val) = std::env::var("RELAYBOT_LIMITS__COOLDOWN_MS") {
        if let Ok(n) = val.parse::<u64>() {
            config.limits.cooldown_ms = n;
        }
    }

    // Logging
    if let Ok(val) = std::env::var("RELAYBOT_LOGGING__FILE") {
        config.logging.file = Some(val);
    }

    // Conventional short names, lowest precedence
    if config.telegram.token.is_empty() {
        if let Ok(val) = std::env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.token = val;
        }
    }
    if config.assistant.api_key.is_empty() {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            config.assistant.api_key = val;
        }
    }
    if config.assistant.assistant_id.is_empty() {
        if let Ok(val) = std::env::var("ASSISTANT_ID") {
            config.assistant.assistant_id = val;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        // Should return defaults
        assert_eq!(config.assistant.poll_interval_ms, 500);
        assert_eq!(config.limits.cooldown_ms, 1000);
    }

    #[test]
    fn load_valid_json() {
        let file = write_temp_json(
            r#"{
            "assistant": {
                "assistantId": "asst_custom",
                "pollIntervalMs": 250
            }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.assistant.assistant_id, "asst_custom");
        assert_eq!(config.assistant.poll_interval_ms, 250);
        // Default preserved
        assert_eq!(config.assistant.max_poll_attempts, 240);
    }

    #[test]
    fn load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.limits.cooldown_ms, 1000);
    }

    #[test]
    fn load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path());
        assert_eq!(config.assistant.poll_interval_ms, 500);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.telegram.token = "123:abc".to_string();
        config.assistant.assistant_id = "asst_saved".to_string();
        config.limits.cooldown_ms = 2500;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.telegram.token, "123:abc");
        assert_eq!(reloaded.assistant.assistant_id, "asst_saved");
        assert_eq!(reloaded.limits.cooldown_ms, 2500);
    }

    #[test]
    fn env_override_token() {
        std::env::set_var("RELAYBOT_TELEGRAM__TOKEN", "env-token");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.telegram.token, "env-token");
        std::env::remove_var("RELAYBOT_TELEGRAM__TOKEN");
    }

    #[test]
    fn env_override_allowed_users_splits_on_commas() {
        std::env::set_var("RELAYBOT_TELEGRAM__ALLOWED_USERS", "123, alice,,bob");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.telegram.allowed_users, vec!["123", "alice", "bob"]);
        std::env::remove_var("RELAYBOT_TELEGRAM__ALLOWED_USERS");
    }

    #[test]
    fn env_override_poll_interval() {
        std::env::set_var("RELAYBOT_ASSISTANT__POLL_INTERVAL_MS", "125");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.assistant.poll_interval_ms, 125);
        std::env::remove_var("RELAYBOT_ASSISTANT__POLL_INTERVAL_MS");
    }

    #[test]
    fn short_name_fallback_fills_empty_key() {
        std::env::set_var("ASSISTANT_ID", "asst_from_short_name");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.assistant.assistant_id, "asst_from_short_name");
        std::env::remove_var("ASSISTANT_ID");
    }

    #[test]
    fn short_name_does_not_override_configured_key() {
        std::env::set_var("ASSISTANT_ID", "asst_short");
        let mut config = Config::default();
        config.assistant.assistant_id = "asst_configured".to_string();
        let config = apply_env_overrides(config);
        assert_eq!(config.assistant.assistant_id, "asst_configured");
        std::env::remove_var("ASSISTANT_ID");
    }

    #[test]
    fn saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["assistant"].get("maxPollAttempts").is_some());
        assert!(raw["assistant"].get("max_poll_attempts").is_none());
    }
}
