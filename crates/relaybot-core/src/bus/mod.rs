//! Message bus — inbound/outbound queues between channels and the
//! orchestrator, plus the event types flowing through them.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{InboundMessage, OutboundMessage};
