//! Runtime for chat widget instances
//!
//! Each widget pairs a panel controller with a conversation store. The
//! registry owns every live widget and disposes them on close or once they
//! have sat idle past the configured TTL.

mod store;

#[cfg(test)]
pub mod testing;

pub use store::ConversationStore;

use crate::config::WidgetConfig;
use crate::panel::{PanelController, PanelVisibility};
use crate::render::Appearance;
use crate::reply::ReplySource;
use crate::state_machine::{ConvContext, ConvState, Message, TransitionError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Upper bound on the gap between idle sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Events sent to stream subscribers
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    Init { snapshot: WidgetSnapshot },
    Message { message: Message },
    StateChange { state: ConvState },
    Panel { visibility: PanelVisibility },
    AgentDone,
    Error { message: String },
}

/// Everything the rendering layer reads to paint a widget
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub id: String,
    pub is_open: bool,
    pub is_composing: bool,
    pub state: ConvState,
    pub messages: Vec<Message>,
    pub appearance: Appearance,
}

impl WidgetSnapshot {
    pub fn visibility(&self) -> PanelVisibility {
        if self.is_open {
            PanelVisibility::Open
        } else {
            PanelVisibility::Closed
        }
    }
}

/// One panel instance: visibility plus conversation
pub struct ChatWidget {
    id: String,
    panel: Mutex<PanelController>,
    store: ConversationStore,
    appearance: Appearance,
    last_active: Mutex<Instant>,
}

impl ChatWidget {
    pub fn new(
        id: impl Into<String>,
        config: &WidgetConfig,
        reply_source: Arc<dyn ReplySource>,
    ) -> Self {
        let id = id.into();
        let context = ConvContext::new(&id, config.reply_delay, &config.fallback_reply);
        let (broadcast_tx, _) = broadcast::channel(128);
        let store = ConversationStore::new(
            context,
            config.seed_messages(),
            reply_source,
            config.reply_timeout,
            broadcast_tx,
        );

        Self {
            id,
            panel: Mutex::new(PanelController::new()),
            store,
            appearance: config.appearance,
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Flip panel visibility and notify subscribers
    pub fn toggle(&self) -> PanelVisibility {
        let visibility = self
            .panel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toggle();
        self.store.publish(WidgetEvent::Panel { visibility });
        visibility
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.panel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .visibility()
    }

    pub fn submit(&self, text: &str) -> Result<(), TransitionError> {
        self.store.submit(text)
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let visibility = self.visibility();
        let (state, messages) = self.store.snapshot();
        WidgetSnapshot {
            id: self.id.clone(),
            is_open: visibility.is_open(),
            is_composing: state.is_composing(),
            state,
            messages,
            appearance: self.appearance,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.store.subscribe()
    }

    pub fn teardown(&self) {
        self.store.teardown();
    }

    /// Mark the widget as in use now
    fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Untouched for at least `ttl` and no stream attached
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        let last_active = *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.store.subscriber_count() == 0 && now.saturating_duration_since(last_active) >= ttl
    }
}

/// Manager for all widget instances
pub struct WidgetRegistry {
    config: Arc<WidgetConfig>,
    reply_source: Arc<dyn ReplySource>,
    widgets: RwLock<HashMap<String, Arc<ChatWidget>>>,
}

impl WidgetRegistry {
    pub fn new(config: Arc<WidgetConfig>, reply_source: Arc<dyn ReplySource>) -> Self {
        Self {
            config,
            reply_source,
            widgets: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Arc<WidgetConfig> {
        &self.config
    }

    /// Create a fresh widget: closed panel, seeded conversation
    pub async fn create(&self) -> Arc<ChatWidget> {
        let id = uuid::Uuid::new_v4().to_string();
        let widget = Arc::new(ChatWidget::new(
            &id,
            &self.config,
            Arc::clone(&self.reply_source),
        ));
        self.widgets.write().await.insert(id.clone(), Arc::clone(&widget));
        tracing::info!(widget_id = %id, "Widget created");
        widget
    }

    /// Look up a widget and refresh its idle timer
    pub async fn get(&self, id: &str) -> Option<Arc<ChatWidget>> {
        let widget = self.widgets.read().await.get(id).cloned()?;
        widget.touch();
        Some(widget)
    }

    /// Tear down and forget a widget. Returns false for unknown ids.
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.widgets.write().await.remove(id);
        match removed {
            Some(widget) => {
                widget.teardown();
                tracing::info!(widget_id = %id, "Widget closed");
                true
            }
            None => false,
        }
    }

    #[allow(dead_code)] // Used by tests
    pub async fn count(&self) -> usize {
        self.widgets.read().await.len()
    }

    /// Tear down every widget idle past the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.idle_ttl;

        let evicted: Vec<Arc<ChatWidget>> = {
            let mut widgets = self.widgets.write().await;
            let idle: Vec<String> = widgets
                .iter()
                .filter(|(_, widget)| widget.is_idle(now, ttl))
                .map(|(id, _)| id.clone())
                .collect();
            idle.iter().filter_map(|id| widgets.remove(id)).collect()
        };

        for widget in &evicted {
            widget.teardown();
            tracing::info!(widget_id = %widget.id(), "Idle widget evicted");
        }
        evicted.len()
    }

    /// Periodically evict idle widgets until the registry is dropped
    pub fn spawn_idle_sweep(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let period = self.config.idle_ttl.min(MAX_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(registry) = weak.upgrade() else {
                    break;
                };
                let evicted = registry.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Idle sweep finished");
                }
            }
        })
    }
}
