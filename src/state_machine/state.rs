//! Conversation state types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ordering key of a message within one conversation
pub type MessageId = u64;

// ============================================================================
// Messages
// ============================================================================

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

/// A committed chat message. Never edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::User,
        }
    }

    pub fn agent(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::Agent,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for user input, no reply pending
    #[default]
    Idle,

    /// A deferred agent reply is pending for the given user message
    Composing { reply_to: MessageId },

    /// Widget was torn down; late replies are discarded
    Disposed,
}

impl ConvState {
    /// True while the agent "is typing"
    pub fn is_composing(&self) -> bool {
        matches!(self, ConvState::Composing { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::Composing { .. } => "composing",
            ConvState::Disposed => "disposed",
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub widget_id: String,
    /// Latency before the deferred reply is requested
    pub reply_delay: Duration,
    /// Agent message appended when the reply source fails
    pub fallback_reply: String,
}

/// Reference reply latency of the demo widget
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(2000);

impl ConvContext {
    pub fn new(
        widget_id: impl Into<String>,
        reply_delay: Duration,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            widget_id: widget_id.into(),
            reply_delay,
            fallback_reply: fallback_reply.into(),
        }
    }
}
