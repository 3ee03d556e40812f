//! Effects produced by state transitions

use crate::state_machine::state::{ConvState, Message, MessageId};
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the conversation
    AppendMessage { message: Message },

    /// Arm the one-shot deferred reply
    ScheduleReply {
        reply_to: MessageId,
        prompt: String,
        delay: Duration,
    },

    /// Cancel the pending deferred reply, if any
    CancelReply,

    /// Notify subscribers of the new state
    NotifyStateChange { state: ConvState },

    /// Notify subscribers that the agent turn finished
    NotifyAgentDone,
}

impl Effect {
    pub fn append_user_message(id: MessageId, content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::user(id, content),
        }
    }

    pub fn append_agent_message(id: MessageId, content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::agent(id, content),
        }
    }

    pub fn notify_state_change(state: &ConvState) -> Self {
        Effect::NotifyStateChange {
            state: state.clone(),
        }
    }
}
