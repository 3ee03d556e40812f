//! Pure state transition function
//!
//! Given the same state, context, and event this always yields the same
//! new state and effects. All I/O (timers, broadcasts) happens in the
//! executor.

use super::{ConvContext, ConvState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// State is left as-is and nothing happens
    pub fn unchanged(state: &ConvState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Agent reply is pending, cannot accept message yet")]
    ReplyPending,
    #[error("Widget has been closed")]
    Disposed,
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User Messages
        // ============================================================

        // Blank composer input is ignored in every live state
        (ConvState::Idle | ConvState::Composing { .. }, Event::UserMessage { text, .. })
            if text.trim().is_empty() =>
        {
            Ok(TransitionResult::unchanged(state))
        }

        // Idle + UserMessage -> Composing
        (ConvState::Idle, Event::UserMessage { message_id, text }) => {
            let new_state = ConvState::Composing {
                reply_to: message_id,
            };
            Ok(TransitionResult::new(new_state.clone())
                .with_effect(Effect::append_user_message(message_id, text.clone()))
                .with_effect(Effect::ScheduleReply {
                    reply_to: message_id,
                    prompt: text,
                    delay: context.reply_delay,
                })
                .with_effect(Effect::notify_state_change(&new_state)))
        }

        // One pending reply at a time
        (ConvState::Composing { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::ReplyPending)
        }

        (ConvState::Disposed, Event::UserMessage { .. }) => Err(TransitionError::Disposed),

        // ============================================================
        // Deferred Reply
        // ============================================================

        // Composing + ReplyReady -> Idle
        (
            ConvState::Composing { reply_to },
            Event::ReplyReady {
                reply_to: answered,
                message_id,
                text,
            },
        ) if *reply_to == answered => {
            // Committed messages are never blank
            let content = if text.trim().is_empty() {
                context.fallback_reply.clone()
            } else {
                text
            };
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::append_agent_message(message_id, content))
                .with_effect(Effect::notify_state_change(&ConvState::Idle))
                .with_effect(Effect::NotifyAgentDone))
        }

        // Composing + ReplyFailed -> Idle with fallback message
        (
            ConvState::Composing { reply_to },
            Event::ReplyFailed {
                reply_to: answered,
                message_id,
                error_kind,
                message,
            },
        ) if *reply_to == answered => {
            tracing::debug!(
                reply_to = answered,
                kind = ?error_kind,
                error = %message,
                "Substituting fallback reply"
            );
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::append_agent_message(
                    message_id,
                    context.fallback_reply.clone(),
                ))
                .with_effect(Effect::notify_state_change(&ConvState::Idle))
                .with_effect(Effect::NotifyAgentDone))
        }

        // Stale or late replies are discarded
        (_, Event::ReplyReady { .. } | Event::ReplyFailed { .. }) => {
            Ok(TransitionResult::unchanged(state))
        }

        // ============================================================
        // Teardown
        // ============================================================
        (ConvState::Composing { .. }, Event::Teardown) => {
            Ok(TransitionResult::new(ConvState::Disposed)
                .with_effect(Effect::CancelReply)
                .with_effect(Effect::notify_state_change(&ConvState::Disposed)))
        }

        (ConvState::Idle, Event::Teardown) => Ok(TransitionResult::new(ConvState::Disposed)
            .with_effect(Effect::notify_state_change(&ConvState::Disposed))),

        (ConvState::Disposed, Event::Teardown) => Ok(TransitionResult::unchanged(state)),
    }
}
