//! Conversation store: executor for the conversation state machine

use super::WidgetEvent;
use crate::reply::{ReplyError, ReplySource};
use crate::state_machine::{
    transition, ConvContext, ConvState, Effect, Event, Message, MessageId, TransitionError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Mutable conversation data guarded by the store
#[derive(Debug)]
struct Conversation {
    state: ConvState,
    messages: Vec<Message>,
    /// Token of the armed deferred reply
    reply_cancel: Option<CancellationToken>,
}

impl Conversation {
    fn next_message_id(&self) -> MessageId {
        self.messages.last().map_or(1, |m| m.id + 1)
    }
}

struct Shared {
    context: ConvContext,
    conversation: Mutex<Conversation>,
    reply_source: Arc<dyn ReplySource>,
    reply_timeout: Duration,
    broadcast_tx: broadcast::Sender<WidgetEvent>,
    /// Cancelled on teardown; parent of every reply token
    lifetime: CancellationToken,
}

/// Ordered message history plus the simulated request/response cycle.
///
/// Mutations run under a short lock and never across an await, so events
/// are applied one at a time in arrival order. A tokio runtime must be
/// running when a message is submitted since the reply is a spawned task.
pub struct ConversationStore {
    shared: Arc<Shared>,
}

impl ConversationStore {
    pub fn new(
        context: ConvContext,
        seed: Vec<Message>,
        reply_source: Arc<dyn ReplySource>,
        reply_timeout: Duration,
        broadcast_tx: broadcast::Sender<WidgetEvent>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                context,
                conversation: Mutex::new(Conversation {
                    state: ConvState::Idle,
                    messages: seed,
                    reply_cancel: None,
                }),
                reply_source,
                reply_timeout,
                broadcast_tx,
                lifetime: CancellationToken::new(),
            }),
        }
    }

    /// Append a user message and arm the deferred reply.
    ///
    /// Blank text is silently ignored.
    pub fn submit(&self, text: &str) -> Result<(), TransitionError> {
        let mut conv = self.shared.lock();
        let message_id = conv.next_message_id();
        self.shared.apply(
            &mut conv,
            Event::UserMessage {
                message_id,
                text: text.to_string(),
            },
        )
    }

    /// Dispose the conversation and cancel any pending reply
    pub fn teardown(&self) {
        {
            let mut conv = self.shared.lock();
            if let Err(e) = self.shared.apply(&mut conv, Event::Teardown) {
                tracing::warn!(error = %e, "Teardown rejected");
            }
        }
        self.shared.lifetime.cancel();
    }

    #[allow(dead_code)] // API completeness
    pub fn messages(&self) -> Vec<Message> {
        self.shared.lock().messages.clone()
    }

    #[allow(dead_code)] // API completeness
    pub fn state(&self) -> ConvState {
        self.shared.lock().state.clone()
    }

    #[allow(dead_code)] // API completeness
    pub fn is_composing(&self) -> bool {
        self.shared.lock().state.is_composing()
    }

    /// State and messages read under one lock
    pub fn snapshot(&self) -> (ConvState, Vec<Message>) {
        let conv = self.shared.lock();
        (conv.state.clone(), conv.messages.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.shared.broadcast_tx.subscribe()
    }

    /// Number of attached stream receivers
    pub fn subscriber_count(&self) -> usize {
        self.shared.broadcast_tx.receiver_count()
    }

    pub(crate) fn publish(&self, event: WidgetEvent) {
        let _ = self.shared.broadcast_tx.send(event);
    }
}

impl Drop for ConversationStore {
    fn drop(&mut self) {
        self.shared.lifetime.cancel();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(
        self: &Arc<Self>,
        conv: &mut Conversation,
        event: Event,
    ) -> Result<(), TransitionError> {
        let result = transition(&conv.state, &self.context, event).inspect_err(|e| {
            tracing::debug!(widget_id = %self.context.widget_id, error = %e, "Transition rejected");
        })?;

        if conv.state != result.new_state {
            tracing::debug!(
                widget_id = %self.context.widget_id,
                from = conv.state.type_name(),
                to = result.new_state.type_name(),
                "State transition"
            );
        }
        conv.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(conv, effect);
        }

        if !conv.state.is_composing() {
            conv.reply_cancel = None;
        }
        Ok(())
    }

    fn execute_effect(self: &Arc<Self>, conv: &mut Conversation, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                conv.messages.push(message.clone());
                let _ = self.broadcast_tx.send(WidgetEvent::Message { message });
            }

            Effect::ScheduleReply {
                reply_to,
                prompt,
                delay,
            } => {
                if let Some(previous) = conv.reply_cancel.take() {
                    previous.cancel();
                }
                let token = self.lifetime.child_token();
                conv.reply_cancel = Some(token.clone());
                self.spawn_reply(reply_to, prompt, delay, token);
            }

            Effect::CancelReply => {
                if let Some(token) = conv.reply_cancel.take() {
                    tracing::info!(widget_id = %self.context.widget_id, "Cancelling pending reply");
                    token.cancel();
                }
            }

            Effect::NotifyStateChange { state } => {
                let _ = self.broadcast_tx.send(WidgetEvent::StateChange { state });
            }

            Effect::NotifyAgentDone => {
                let _ = self.broadcast_tx.send(WidgetEvent::AgentDone);
            }
        }
    }

    fn spawn_reply(
        self: &Arc<Self>,
        reply_to: MessageId,
        prompt: String,
        delay: Duration,
        token: CancellationToken,
    ) {
        // Deadline is fixed at submission, not when the task is first polled
        let deadline = tokio::time::Instant::now() + delay;
        let weak: Weak<Self> = Arc::downgrade(self);
        let source = Arc::clone(&self.reply_source);
        let timeout = self.reply_timeout;
        let widget_id = self.context.widget_id.clone();

        tracing::debug!(
            widget_id = %widget_id,
            reply_to,
            delay_ms = %delay.as_millis(),
            "Reply scheduled"
        );

        tokio::spawn(async move {
            let outcome = tokio::select! {
                () = token.cancelled() => {
                    tracing::debug!(
                        widget_id = %widget_id,
                        reply_to,
                        "Reply cancelled before completion"
                    );
                    return;
                }
                outcome = async {
                    tokio::time::sleep_until(deadline).await;
                    tokio::time::timeout(timeout, source.reply(&prompt)).await
                } => outcome,
            };

            let outcome = outcome.unwrap_or_else(|_| {
                Err(ReplyError::timeout(format!(
                    "No reply within {}ms",
                    timeout.as_millis()
                )))
            });

            // Store dropped while the reply was in flight
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if token.is_cancelled() {
                return;
            }
            shared.complete_reply(reply_to, outcome);
        });
    }

    fn complete_reply(self: &Arc<Self>, reply_to: MessageId, outcome: Result<String, ReplyError>) {
        let mut conv = self.lock();
        let message_id = conv.next_message_id();
        let event = match outcome {
            Ok(text) => Event::ReplyReady {
                reply_to,
                message_id,
                text,
            },
            Err(e) => {
                tracing::warn!(
                    widget_id = %self.context.widget_id,
                    reply_to,
                    error = %e,
                    kind = ?e.kind,
                    "Reply source failed, using fallback"
                );
                let _ = self.broadcast_tx.send(WidgetEvent::Error {
                    message: e.message.clone(),
                });
                Event::ReplyFailed {
                    reply_to,
                    message_id,
                    error_kind: e.kind,
                    message: e.message,
                }
            }
        };

        if let Err(e) = self.apply(&mut conv, event) {
            tracing::warn!(
                widget_id = %self.context.widget_id,
                error = %e,
                "Failed to apply reply"
            );
        }
    }
}
