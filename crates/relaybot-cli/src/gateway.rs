//! Gateway command — wires the channel, orchestrator, and assistant client.
//!
//! Startup sequence:
//! 1. Load config + validate credentials (missing token/key aborts here)
//! 2. Initialize logging (stderr + file)
//! 3. Create bus, session store, rate limiter, assistant client
//! 4. Create orchestrator and channel manager
//! 5. Run: `tokio::select!` of orchestrator + channel manager
//! 6. Handle Ctrl+C for graceful shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use relaybot_agent::Orchestrator;
use relaybot_assistant::HttpAssistantClient;
use relaybot_channels::ChannelManager;
use relaybot_core::bus::queue::MessageBus;
use relaybot_core::config::load_config;
use relaybot_core::ratelimit::RateLimiter;
use relaybot_core::session::SessionStore;
use relaybot_core::utils::{expand_home, get_default_log_path};

use crate::helpers;

/// Run the gateway — starts the orchestrator + channel manager.
pub async fn run(verbose: bool) -> Result<()> {
    // 1. Load + validate config. A missing credential is a bootstrap
    //    failure: abort before anything is started.
    let config = load_config(None);
    config
        .validate()
        .context("cannot start gateway")?;

    // 2. Logging: stderr + append-only file
    let log_path = config
        .logging
        .file
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(get_default_log_path);
    crate::init_logging(verbose, Some(log_path.as_path()));

    println!();
    helpers::print_banner();
    println!("  Mode: Gateway");
    println!();

    // 3. Shared state
    let bus = Arc::new(MessageBus::new(100));
    let sessions = Arc::new(SessionStore::new());
    let limiter = Arc::new(RateLimiter::new(config.limits.cooldown()));
    let client = Arc::new(HttpAssistantClient::new(
        config.assistant.api_key.clone(),
        config.assistant.api_base.clone(),
    ));

    // 4. Orchestrator
    let orchestrator = Arc::new(Orchestrator::new(
        bus.clone(),
        client,
        sessions.clone(),
        limiter,
        config.assistant.assistant_id.clone(),
        config.assistant.poll_interval(),
        config.assistant.max_poll_attempts,
    ));

    // 5. Channel manager
    #[allow(unused_mut)]
    let mut channel_manager = ChannelManager::new(bus.clone());

    #[cfg(feature = "telegram")]
    {
        use relaybot_channels::telegram::TelegramChannel;
        let telegram = TelegramChannel::new(
            config.telegram.token.clone(),
            bus.clone(),
            sessions.clone(),
            config.telegram.allowed_users.clone(),
        );
        channel_manager.register(Arc::new(telegram));
        info!("registered telegram channel");
    }

    info!(
        assistant_id = %config.assistant.assistant_id,
        channels = ?channel_manager.channel_names(),
        log_file = %log_path.display(),
        "gateway starting"
    );

    println!("  Assistant: {}", config.assistant.assistant_id);
    println!("  Cooldown:  {}ms", config.limits.cooldown_ms);
    println!("  Channels:  {} registered", channel_manager.len());
    println!("  Log file:  {}", log_path.display());
    println!();

    if channel_manager.is_empty() {
        println!("  ⚠  No channels registered. Build with the `telegram`");
        println!("     feature to actually talk to users.");
        println!();
    }

    println!("  Ctrl+C to stop");
    println!();

    // 6. Run: orchestrator + channel manager concurrently,
    //    Ctrl+C triggers graceful shutdown
    tokio::select! {
        _ = orchestrator.clone().run() => {
            info!("orchestrator exited");
        }
        result = channel_manager.start_all() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "channel manager error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            channel_manager.stop_all().await;
        }
    }

    println!("  Gateway stopped. Goodbye!");
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
