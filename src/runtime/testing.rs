//! Mock reply sources and store-level integration tests
//!
//! Timer scenarios run on a paused tokio clock so the reply delay is
//! advanced explicitly instead of waited out.

use super::{ConversationStore, WidgetEvent, WidgetRegistry};
use crate::config::WidgetConfig;
use crate::reply::{CannedReply, ReplyError, ReplyErrorKind, ReplySource};
use crate::state_machine::{ConvContext, Message};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

pub const TEST_DELAY: Duration = Duration::from_millis(2000);
pub const TEST_FALLBACK: &str = "fallback reply";

// ============================================================================
// Mock Reply Sources
// ============================================================================

/// Records every prompt and answers with a fixed text
pub struct RecordingReply {
    text: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySource for RecordingReply {
    async fn reply(&self, prompt: &str) -> Result<String, ReplyError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Always fails with the given kind
pub struct FailingReply {
    kind: ReplyErrorKind,
}

impl FailingReply {
    pub fn new(kind: ReplyErrorKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl ReplySource for FailingReply {
    async fn reply(&self, _prompt: &str) -> Result<String, ReplyError> {
        Err(ReplyError::new(self.kind, "backend unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Answers only after its own latency (for timeout testing)
pub struct DelayedReply {
    delay: Duration,
}

impl DelayedReply {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReplySource for DelayedReply {
    async fn reply(&self, _prompt: &str) -> Result<String, ReplyError> {
        tokio::time::sleep(self.delay).await;
        Ok("slow reply".to_string())
    }

    fn name(&self) -> &str {
        "delayed"
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn test_store(
    source: Arc<dyn ReplySource>,
    seed: Vec<Message>,
    reply_timeout: Duration,
) -> (ConversationStore, broadcast::Receiver<WidgetEvent>) {
    let (broadcast_tx, broadcast_rx) = broadcast::channel(128);
    let context = ConvContext::new("test-widget", TEST_DELAY, TEST_FALLBACK);
    let store = ConversationStore::new(context, seed, source, reply_timeout, broadcast_tx);
    (store, broadcast_rx)
}

pub fn canned_store() -> (ConversationStore, broadcast::Receiver<WidgetEvent>) {
    test_store(
        Arc::new(CannedReply::new("canned")),
        Vec::new(),
        Duration::from_secs(30),
    )
}

pub fn test_registry(idle_ttl: Duration) -> Arc<WidgetRegistry> {
    let config = WidgetConfig {
        idle_ttl,
        ..WidgetConfig::default()
    };
    Arc::new(WidgetRegistry::new(
        Arc::new(config),
        Arc::new(CannedReply::new("canned")),
    ))
}

/// Wait for `AgentDone` with timeout
pub async fn wait_for_done(rx: &mut broadcast::Receiver<WidgetEvent>, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(WidgetEvent::AgentDone)) => return true,
            Ok(Ok(_)) => continue,
            Ok(Err(_)) | Err(_) => return false,
        }
    }
    false
}

/// Let spawned tasks run without advancing the clock
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{ConvState, Sender, TransitionError};

    #[tokio::test(start_paused = true)]
    async fn test_submit_then_reply_after_delay() {
        let (store, mut rx) = canned_store();

        store.submit("Hi").unwrap();
        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].content, "Hi");
        assert!(store.is_composing());

        tokio::time::advance(TEST_DELAY).await;
        assert!(wait_for_done(&mut rx, Duration::from_secs(1)).await);

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Agent);
        assert_eq!(messages[1].content, "canned");
        assert!(!store.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_not_before_delay() {
        let (store, _rx) = canned_store();
        store.submit("Hi").unwrap();

        tokio::time::advance(TEST_DELAY - Duration::from_millis(1)).await;
        settle().await;

        assert_eq!(store.messages().len(), 1);
        assert!(store.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submissions_are_ignored() {
        let (store, _rx) = canned_store();
        store.submit("").unwrap();
        store.submit("   ").unwrap();

        assert!(store.messages().is_empty());
        assert!(!store.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_composing_is_rejected() {
        let source = Arc::new(RecordingReply::new("ok"));
        let (store, mut rx) = test_store(source.clone(), Vec::new(), Duration::from_secs(30));

        store.submit("first").unwrap();
        assert_eq!(store.submit("second"), Err(TransitionError::ReplyPending));
        assert_eq!(store.messages().len(), 1);

        assert!(wait_for_done(&mut rx, Duration::from_secs(5)).await);
        settle().await;

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(source.recorded_prompts(), vec!["first".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_reply() {
        let (store, _rx) = canned_store();
        store.submit("Hi").unwrap();
        store.teardown();

        tokio::time::sleep(TEST_DELAY * 3).await;
        settle().await;

        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.state(), ConvState::Disposed);
        assert_eq!(store.submit("again"), Err(TransitionError::Disposed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_store_discards_reply() {
        let (store, mut rx) = canned_store();
        store.submit("Hi").unwrap();
        drop(store);

        tokio::time::sleep(TEST_DELAY * 3).await;
        settle().await;

        // Only the events emitted before the drop were delivered
        let mut saw_agent_done = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, WidgetEvent::AgentDone) {
                saw_agent_done = true;
            }
        }
        assert!(!saw_agent_done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_source_appends_fallback() {
        let (store, mut rx) = test_store(
            Arc::new(FailingReply::new(ReplyErrorKind::Unavailable)),
            Vec::new(),
            Duration::from_secs(30),
        );
        store.submit("Hi").unwrap();

        assert!(wait_for_done(&mut rx, Duration::from_secs(5)).await);

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Agent);
        assert_eq!(messages[1].content, TEST_FALLBACK);
        assert!(!store.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_to_fallback() {
        let source = Arc::new(DelayedReply::new(Duration::from_secs(120)));
        let (store, mut rx) = test_store(source, Vec::new(), Duration::from_secs(1));
        store.submit("Hi").unwrap();

        assert!(wait_for_done(&mut rx, Duration::from_secs(10)).await);

        let messages = store.messages();
        assert_eq!(messages[1].content, TEST_FALLBACK);
        assert!(!store.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_continue_after_seed() {
        let seed = vec![Message::agent(1, "hello"), Message::user(2, "q"), Message::agent(3, "a")];
        let (store, mut rx) = test_store(
            Arc::new(CannedReply::new("canned")),
            seed,
            Duration::from_secs(30),
        );

        for text in ["one", "two", "three"] {
            store.submit(text).unwrap();
            assert!(wait_for_done(&mut rx, Duration::from_secs(5)).await);
        }

        let ids: Vec<_> = store.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_order() {
        let (store, mut rx) = canned_store();
        store.submit("Hi").unwrap();
        assert!(wait_for_done(&mut rx, Duration::from_secs(5)).await);

        let mut rx = store.subscribe();
        store.submit("again").unwrap();
        tokio::time::advance(TEST_DELAY).await;
        settle().await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                WidgetEvent::Message { message } => format!("message:{}", message.sender.as_str()),
                WidgetEvent::StateChange { state } => format!("state:{}", state.type_name()),
                WidgetEvent::AgentDone => "done".to_string(),
                other => format!("{other:?}"),
            });
        }
        assert_eq!(
            kinds,
            vec![
                "message:user",
                "state:composing",
                "message:agent",
                "state:idle",
                "done",
            ]
        );
    }

    // ========================================================================
    // Idle eviction
    // ========================================================================

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_idle_widget_is_evicted_and_torn_down() {
        let registry = test_registry(TTL);
        let widget = registry.create().await;

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(registry.evict_idle().await, 1);
        assert_eq!(registry.count().await, 0);
        assert!(registry.get(widget.id()).await.is_none());

        // A handle that outlived eviction sees a disposed conversation
        assert_eq!(widget.snapshot().state, ConvState::Disposed);
        assert_eq!(widget.submit("hello"), Err(TransitionError::Disposed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touched_widget_survives_sweep() {
        let registry = test_registry(TTL);
        let widget = registry.create().await;
        let id = widget.id().to_string();

        tokio::time::advance(TTL / 2 + Duration::from_secs(10)).await;
        assert!(registry.get(&id).await.is_some());
        tokio::time::advance(TTL / 2 + Duration::from_secs(10)).await;

        assert_eq!(registry.evict_idle().await, 0);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_streamed_widget_survives_sweep() {
        let registry = test_registry(TTL);
        let widget = registry.create().await;
        let rx = widget.subscribe();

        tokio::time::advance(TTL * 3).await;
        assert_eq!(registry.evict_idle().await, 0);

        drop(rx);
        assert_eq!(registry.evict_idle().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_cancels_pending_reply() {
        let registry = test_registry(Duration::from_millis(500));
        let widget = registry.create().await;
        widget.submit("Hi").unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(registry.evict_idle().await, 1);

        tokio::time::sleep(TEST_DELAY * 2).await;
        settle().await;

        let snapshot = widget.snapshot();
        assert_eq!(snapshot.messages.last().map(|m| m.sender), Some(Sender::User));
        assert_eq!(snapshot.state, ConvState::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_bounds_registry() {
        let registry = test_registry(TTL);
        for _ in 0..100 {
            registry.create().await;
        }
        let sweep = registry.spawn_idle_sweep();

        tokio::time::sleep(TTL * 3).await;
        settle().await;
        assert_eq!(registry.count().await, 0);

        // The sweep stops once the registry is gone
        drop(registry);
        tokio::time::sleep(TTL * 2).await;
        settle().await;
        assert!(sweep.is_finished());
    }
}
