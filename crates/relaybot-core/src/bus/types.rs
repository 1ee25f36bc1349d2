//! Bus event types — messages flowing between the chat channel and the
//! orchestrator.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// An inbound text message from a channel to the orchestrator.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform user id of the sender.
    pub user_id: UserId,
    /// Chat identifier replies should be sent to.
    pub chat_id: String,
    /// Text content of the message.
    pub content: String,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
    /// Channel-specific metadata (e.g. username, first_name, message_id).
    pub metadata: HashMap<String, String>,
}

impl InboundMessage {
    /// Create a new inbound message with minimal required fields.
    pub fn new(
        channel: impl Into<String>,
        user_id: UserId,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        InboundMessage {
            channel: channel.into(),
            user_id,
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

/// An outbound reply from the orchestrator to a channel.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    /// Target channel name.
    pub channel: String,
    /// Target chat identifier.
    pub chat_id: String,
    /// Text content to send.
    pub content: String,
}

impl OutboundMessage {
    /// Create a new outbound message.
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            chat_id: chat_id.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_message_creation() {
        let msg = InboundMessage::new("telegram", 42, "chat_99", "Hello!");

        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, 42);
        assert_eq!(msg.chat_id, "chat_99");
        assert_eq!(msg.content, "Hello!");
        assert!(msg.metadata.is_empty());
    }

    #[test]
    fn inbound_with_metadata() {
        let mut msg = InboundMessage::new("telegram", 1, "chat_1", "hi");
        msg.metadata
            .insert("username".to_string(), "alice".to_string());
        msg.metadata
            .insert("message_id".to_string(), "12345".to_string());

        assert_eq!(msg.metadata.get("username").unwrap(), "alice");
        assert_eq!(msg.metadata.get("message_id").unwrap(), "12345");
    }

    #[test]
    fn outbound_message_creation() {
        let msg = OutboundMessage::new("telegram", "chat_99", "Here's your answer!");

        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.chat_id, "chat_99");
        assert_eq!(msg.content, "Here's your answer!");
    }
}
