//! Async message bus connecting the chat channel and the orchestrator.
//!
//! Built on `tokio::sync::mpsc` bounded channels:
//! - the channel publishes to `inbound` (user messages arriving)
//! - the orchestrator consumes `inbound`, processes, publishes to `outbound`
//! - the channel manager consumes `outbound` and routes to the right channel

use super::types::{InboundMessage, OutboundMessage};
use tokio::sync::mpsc;

/// The message bus connecting channels ↔ orchestrator.
pub struct MessageBus {
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    outbound_tx: mpsc::Sender<OutboundMessage>,
    outbound_rx: tokio::sync::Mutex<mpsc::Receiver<OutboundMessage>>,
}

impl MessageBus {
    /// Create a new message bus with the given buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);

        MessageBus {
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            outbound_tx,
            outbound_rx: tokio::sync::Mutex::new(outbound_rx),
        }
    }

    /// Publish a message from a channel to the orchestrator (inbound).
    pub async fn publish_inbound(
        &self,
        msg: InboundMessage,
    ) -> Result<(), mpsc::error::SendError<InboundMessage>> {
        self.inbound_tx.send(msg).await
    }

    /// Consume the next inbound message (blocks until available).
    /// Returns None if all senders are dropped.
    pub async fn consume_inbound(&self) -> Option<InboundMessage> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await
    }

    /// Publish a reply from the orchestrator to a channel (outbound).
    pub async fn publish_outbound(
        &self,
        msg: OutboundMessage,
    ) -> Result<(), mpsc::error::SendError<OutboundMessage>> {
        self.outbound_tx.send(msg).await
    }

    /// Consume the next outbound message (blocks until available).
    /// Returns None if all senders are dropped.
    pub async fn consume_outbound(&self) -> Option<OutboundMessage> {
        let mut rx = self.outbound_rx.lock().await;
        rx.recv().await
    }

    /// Get a clone of the inbound sender (for channels to use).
    pub fn inbound_sender(&self) -> mpsc::Sender<InboundMessage> {
        self.inbound_tx.clone()
    }

    /// Get a clone of the outbound sender (for the orchestrator to use).
    pub fn outbound_sender(&self) -> mpsc::Sender<OutboundMessage> {
        self.outbound_tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inbound_message_flow() {
        let bus = MessageBus::new(10);

        let msg = InboundMessage::new("telegram", 1, "chat_1", "Hello!");
        bus.publish_inbound(msg).await.unwrap();

        let received = bus.consume_inbound().await.unwrap();
        assert_eq!(received.channel, "telegram");
        assert_eq!(received.content, "Hello!");
    }

    #[tokio::test]
    async fn outbound_message_flow() {
        let bus = MessageBus::new(10);

        let msg = OutboundMessage::new("telegram", "chat_42", "Reply here");
        bus.publish_outbound(msg).await.unwrap();

        let received = bus.consume_outbound().await.unwrap();
        assert_eq!(received.chat_id, "chat_42");
        assert_eq!(received.content, "Reply here");
    }

    #[tokio::test]
    async fn message_ordering() {
        let bus = MessageBus::new(10);

        for i in 1..=3 {
            let msg = InboundMessage::new("telegram", 7, "chat", format!("msg-{}", i));
            bus.publish_inbound(msg).await.unwrap();
        }

        let m1 = bus.consume_inbound().await.unwrap();
        let m2 = bus.consume_inbound().await.unwrap();
        let m3 = bus.consume_inbound().await.unwrap();

        assert_eq!(m1.content, "msg-1");
        assert_eq!(m2.content, "msg-2");
        assert_eq!(m3.content, "msg-3");
    }

    #[tokio::test]
    async fn sender_clone_works() {
        let bus = MessageBus::new(10);
        let sender = bus.inbound_sender();

        let msg = InboundMessage::new("telegram", 9, "chat_y", "From clone");
        sender.send(msg).await.unwrap();

        let received = bus.consume_inbound().await.unwrap();
        assert_eq!(received.user_id, 9);
        assert_eq!(received.content, "From clone");
    }

    #[tokio::test]
    async fn full_round_trip() {
        // channel → bus → orchestrator → bus → channel
        let bus = std::sync::Arc::new(MessageBus::new(10));

        let inbound = InboundMessage::new("telegram", 42, "chat_99", "What is 2+2?");
        bus.publish_inbound(inbound).await.unwrap();

        let received = bus.consume_inbound().await.unwrap();
        assert_eq!(received.content, "What is 2+2?");

        let reply = OutboundMessage::new(
            received.channel.clone(),
            received.chat_id.clone(),
            "The answer is 4.",
        );
        bus.publish_outbound(reply).await.unwrap();

        let outbound = bus.consume_outbound().await.unwrap();
        assert_eq!(outbound.channel, "telegram");
        assert_eq!(outbound.chat_id, "chat_99");
        assert_eq!(outbound.content, "The answer is 4.");
    }
}
