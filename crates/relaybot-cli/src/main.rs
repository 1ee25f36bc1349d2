//! Relaybot CLI — entry point.
//!
//! # Commands
//!
//! - `relaybot gateway [--logs]` — run the bot (Telegram channel + orchestrator)
//! - `relaybot onboard` — initialize config directory
//! - `relaybot status` — show configuration status

mod gateway;
mod helpers;
mod onboard;
mod status;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🦀 Relaybot — Telegram ⇄ assistant relay bot in Rust
#[derive(Parser)]
#[command(name = "relaybot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (Telegram channel + orchestrator)
    Gateway {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration
    Onboard,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gateway { logs } => gateway::run(logs).await,
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging — stderr plus the append-only file log.
fn init_logging(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("relaybot=debug,info")
    } else {
        EnvFilter::new("info")
    };

    let stderr_layer = fmt::layer().with_target(false).compact();

    let file_layer = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(std::sync::Mutex::new(file)),
            ),
            Err(e) => {
                eprintln!("warning: could not open log file {}: {e}", path.display());
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
