//! Channel trait — the interface every chat channel implements.
//!
//! Each channel:
//! - `start()` — begins listening for incoming updates (long-running)
//! - `stop()` — graceful shutdown
//! - `send()` — delivers an outbound reply to the channel
//! - `name()` — channel identifier matching `OutboundMessage.channel`

use async_trait::async_trait;
use relaybot_core::bus::types::OutboundMessage;

/// Every chat channel implements this trait.
///
/// The `ChannelManager` holds `Arc<dyn Channel>` and orchestrates
/// start/stop/send across all registered channels.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name (e.g. "telegram").
    fn name(&self) -> &str;

    /// Start listening for incoming updates.
    ///
    /// A long-running task publishing `InboundMessage`s to the message bus.
    /// Runs until `stop()` is called.
    async fn start(&self) -> anyhow::Result<()>;

    /// Graceful shutdown — stop listening and clean up resources.
    async fn stop(&self) -> anyhow::Result<()>;

    /// Send an outbound message to this channel.
    ///
    /// Called by the `ChannelManager`'s outbound dispatcher.
    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()>;
}
