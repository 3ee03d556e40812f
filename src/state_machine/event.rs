//! Events that can occur in a conversation

use crate::reply::ReplyErrorKind;
use crate::state_machine::state::MessageId;

/// Events that trigger state transitions
///
/// Message ids are allocated by the executor before dispatch so the
/// transition function stays pure.
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        message_id: MessageId,
        text: String,
    },

    // Deferred reply events
    ReplyReady {
        reply_to: MessageId,
        message_id: MessageId,
        text: String,
    },
    ReplyFailed {
        reply_to: MessageId,
        message_id: MessageId,
        error_kind: ReplyErrorKind,
        message: String,
    },

    // Lifecycle events
    Teardown,
}
