//! Transport contract: the inbound event envelope and outbound delivery.
//!
//! The transport decodes its wire updates into [`InboundEvent`]s and
//! implements [`ReplySink`] for delivery; the engine and dispatcher stay
//! transport-agnostic.

use async_trait::async_trait;
use std::fmt;

use crate::engine::{ChatEvent, Reply};
use crate::error::Result;
use crate::session::UserId;

/// The conversation surface replies are delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded transport event addressed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user: UserId,
    pub chat: ChatId,
    /// Transport acknowledgement handle for button presses, if any.
    pub callback_id: Option<String>,
    pub event: ChatEvent,
}

/// Outbound half of the transport: renders and sends engine replies.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Delivers one engine reply to the given chat.
    async fn deliver(&self, chat: ChatId, reply: &Reply) -> Result<()>;

    /// Acknowledges a button press so the client stops its progress
    /// indicator. Transports without that concept keep the no-op default.
    async fn ack(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}
