//! HTTP API for the chat widget

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::config::WidgetConfig;
use crate::reply::ReplySource;
use crate::runtime::WidgetRegistry;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WidgetRegistry>,
}

impl AppState {
    pub fn new(config: Arc<WidgetConfig>, reply_source: Arc<dyn ReplySource>) -> Self {
        Self {
            registry: Arc::new(WidgetRegistry::new(config, reply_source)),
        }
    }
}
