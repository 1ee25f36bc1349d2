//! `relaybot onboard` — initialize the configuration directory.
//!
//! - Creates `~/.relaybot/`
//! - Writes a default `config.json` if none exists
//! - Prints which credentials still need to be filled in

use anyhow::Result;
use colored::Colorize;

use relaybot_core::config::{get_config_path, load_config, save_config};
use relaybot_core::utils::get_data_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🦀 Relaybot — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    std::fs::create_dir_all(&data_dir)?;
    println!("  {} data dir at {}", "✓".green(), data_dir.display());

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let config = load_config(None); // defaults + any env vars already set
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    let config = load_config(None);
    match config.validate() {
        Ok(()) => {
            println!(
                "{}",
                "  Setup complete! Run `relaybot gateway` to start the bot.".green()
            );
        }
        Err(_) => {
            println!("  Fill in the missing credentials, either in config.json");
            println!("  or via environment variables:");
            println!();
            if config.telegram.token.is_empty() {
                println!("    {}  (from @BotFather)", "TELEGRAM_BOT_TOKEN".bold());
            }
            if config.assistant.api_key.is_empty() {
                println!("    {}      (assistant service key)", "OPENAI_API_KEY".bold());
            }
            if config.assistant.assistant_id.is_empty() {
                println!("    {}        (pre-provisioned assistant)", "ASSISTANT_ID".bold());
            }
            println!();
            println!("  Then check with `relaybot status`.");
        }
    }
    println!();

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
