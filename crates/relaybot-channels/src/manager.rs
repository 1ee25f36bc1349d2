//! Channel Manager — orchestrates channel lifecycle and message routing.
//!
//! Responsibilities:
//! - Register channels
//! - Start/stop all channels concurrently via `tokio::spawn`
//! - Dispatch outbound messages from the bus to the correct channel

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use relaybot_core::bus::queue::MessageBus;

use crate::base::Channel;

/// Manages the lifecycle and message routing for all chat channels.
///
/// Channels are registered with `register()`, started concurrently with
/// `start_all()`, and stopped with `stop_all()`. An outbound dispatcher task
/// reads from the message bus and routes replies to the correct channel.
pub struct ChannelManager {
    /// Registered channels, keyed by name.
    channels: HashMap<String, Arc<dyn Channel>>,
    /// Message bus for outbound message consumption.
    bus: Arc<MessageBus>,
    /// Shutdown signal.
    shutdown: Arc<Notify>,
}

impl ChannelManager {
    /// Create a new channel manager.
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            channels: HashMap::new(),
            bus,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Register a channel. Overwrites any previous channel with the same name.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "registered channel");
        self.channels.insert(name, channel);
    }

    /// Get a registered channel by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.get(name)
    }

    /// The names of all registered channels, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether there are no registered channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Start all channels + the outbound dispatcher.
    ///
    /// Each channel's `start()` is spawned as a background task. This method
    /// blocks until shutdown is signaled.
    pub async fn start_all(&self) -> Result<()> {
        if self.channels.is_empty() {
            warn!("no channels registered, nothing to start");
            return Ok(());
        }

        info!(
            channels = ?self.channel_names(),
            "starting {} channel(s)",
            self.channels.len()
        );

        for (name, channel) in &self.channels {
            let ch = channel.clone();
            let ch_name = name.clone();

            tokio::spawn(async move {
                info!(channel = %ch_name, "channel starting");
                if let Err(e) = ch.start().await {
                    error!(channel = %ch_name, error = %e, "channel start failed");
                }
                info!(channel = %ch_name, "channel stopped");
            });
        }

        // Spawn the outbound dispatcher
        let bus = self.bus.clone();
        let channels = self.channels.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            Self::dispatch_outbound(bus, channels, shutdown).await;
        });

        // Wait for shutdown signal
        self.shutdown.notified().await;

        info!("channel manager shutting down");
        Ok(())
    }

    /// Stop all channels and the outbound dispatcher.
    pub async fn stop_all(&self) {
        info!("stopping all channels");

        self.shutdown.notify_waiters();

        for (name, channel) in &self.channels {
            debug!(channel = %name, "stopping channel");
            if let Err(e) = channel.stop().await {
                error!(channel = %name, error = %e, "channel stop failed");
            }
        }

        info!("all channels stopped");
    }

    /// Outbound message dispatcher — routes replies to the correct channel.
    async fn dispatch_outbound(
        bus: Arc<MessageBus>,
        channels: HashMap<String, Arc<dyn Channel>>,
        shutdown: Arc<Notify>,
    ) {
        info!("outbound dispatcher started");

        loop {
            tokio::select! {
                msg = bus.consume_outbound() => {
                    match msg {
                        Some(msg) => {
                            let Some(channel) = channels.get(&msg.channel) else {
                                warn!(channel = %msg.channel, "no channel registered for outbound message");
                                continue;
                            };
                            debug!(channel = %msg.channel, chat_id = %msg.chat_id, "dispatching outbound");
                            if let Err(e) = channel.send(&msg).await {
                                error!(channel = %msg.channel, error = %e, "outbound send failed");
                            }
                        }
                        None => {
                            info!("outbound channel closed, dispatcher exiting");
                            break;
                        }
                    }
                }
                _ = shutdown.notified() => {
                    info!("outbound dispatcher shutting down");
                    break;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relaybot_core::bus::types::OutboundMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingChannel {
        name: String,
        sent: Arc<AtomicUsize>,
        stop_signal: Arc<Notify>,
    }

    impl CountingChannel {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                sent: Arc::new(AtomicUsize::new(0)),
                stop_signal: Arc::new(Notify::new()),
            }
        }
    }

    #[async_trait]
    impl Channel for CountingChannel {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start(&self) -> anyhow::Result<()> {
            self.stop_signal.notified().await;
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.stop_signal.notify_waiters();
            Ok(())
        }

        async fn send(&self, _msg: &OutboundMessage) -> anyhow::Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn register_and_lookup() {
        let bus = Arc::new(MessageBus::new(8));
        let mut manager = ChannelManager::new(bus);
        assert!(manager.is_empty());

        manager.register(Arc::new(CountingChannel::new("telegram")));
        assert_eq!(manager.len(), 1);
        assert!(manager.get("telegram").is_some());
        assert!(manager.get("discord").is_none());
        assert_eq!(manager.channel_names(), vec!["telegram"]);
    }

    #[test]
    fn register_overwrites_same_name() {
        let bus = Arc::new(MessageBus::new(8));
        let mut manager = ChannelManager::new(bus);

        manager.register(Arc::new(CountingChannel::new("telegram")));
        manager.register(Arc::new(CountingChannel::new("telegram")));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn start_all_with_no_channels_returns_immediately() {
        let bus = Arc::new(MessageBus::new(8));
        let manager = ChannelManager::new(bus);
        manager.start_all().await.unwrap();
    }

    #[tokio::test]
    async fn dispatcher_routes_to_the_named_channel() {
        let bus = Arc::new(MessageBus::new(8));
        let channel = Arc::new(CountingChannel::new("telegram"));
        let sent = channel.sent.clone();

        let mut manager = ChannelManager::new(bus.clone());
        manager.register(channel);
        let manager = Arc::new(manager);

        let runner = manager.clone();
        tokio::spawn(async move {
            let _ = runner.start_all().await;
        });

        // Give the dispatcher a moment to spin up, then publish.
        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.publish_outbound(OutboundMessage::new("telegram", "chat_1", "hi"))
            .await
            .unwrap();
        // A message for an unknown channel is dropped with a warning.
        bus.publish_outbound(OutboundMessage::new("discord", "chat_1", "hi"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sent.load(Ordering::SeqCst), 1);

        manager.stop_all().await;
    }
}
