//! `relaybot status` — show configuration status.

use anyhow::Result;
use colored::Colorize;

use relaybot_core::config::{get_config_path, load_config};
use relaybot_core::utils::{expand_home, get_default_log_path};

use crate::helpers::mask_secret;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🦀 Relaybot Status".cyan().bold());
    println!();

    // Config file
    let config_exists = config_path.exists();
    println!(
        "  {:<16} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Credentials
    println!(
        "  {:<16} {}",
        "Bot token:".bold(),
        mask_secret(&config.telegram.token)
    );
    println!(
        "  {:<16} {}",
        "API key:".bold(),
        mask_secret(&config.assistant.api_key)
    );
    let assistant_id = if config.assistant.assistant_id.is_empty() {
        "(not set)".red().to_string()
    } else {
        config.assistant.assistant_id.clone()
    };
    println!("  {:<16} {}", "Assistant:".bold(), assistant_id);
    if let Some(ref api_base) = config.assistant.api_base {
        println!("  {:<16} {}", "API base:".bold(), api_base);
    }

    // Tunables
    println!();
    println!(
        "  {:<16} {}",
        "Cooldown:".bold(),
        format!("{}ms", config.limits.cooldown_ms).dimmed()
    );
    println!(
        "  {:<16} {}",
        "Run polling:".bold(),
        format!(
            "every {}ms, up to {} attempts",
            config.assistant.poll_interval_ms, config.assistant.max_poll_attempts
        )
        .dimmed()
    );
    let allowed = if config.telegram.allowed_users.is_empty() {
        "everyone".to_string()
    } else {
        format!("{} user(s)", config.telegram.allowed_users.len())
    };
    println!("  {:<16} {}", "Allowed:".bold(), allowed.dimmed());

    let log_path = config
        .logging
        .file
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(get_default_log_path);
    println!(
        "  {:<16} {}",
        "Log file:".bold(),
        log_path.display().to_string().dimmed()
    );

    println!();

    match config.validate() {
        Ok(()) => println!("  {} ready to start: `relaybot gateway`", "✓".green()),
        Err(e) => println!("  {} {}", "✗".red(), e),
    }
    println!();

    Ok(())
}
