//! Reply source abstraction
//!
//! The deferred agent reply is produced by a `ReplySource`. The widget ships
//! only the canned source; a chat backend plugs in behind the same trait.

mod canned;
mod error;

pub use canned::{CannedReply, DEFAULT_CANNED_REPLY};
pub use error::{ReplyError, ReplyErrorKind};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for reply providers
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Produce the agent reply to a user message
    async fn reply(&self, prompt: &str) -> Result<String, ReplyError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Logging wrapper for reply sources
pub struct LoggingReply {
    inner: Arc<dyn ReplySource>,
    name: String,
}

impl LoggingReply {
    pub fn new(inner: Arc<dyn ReplySource>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl ReplySource for LoggingReply {
    async fn reply(&self, prompt: &str) -> Result<String, ReplyError> {
        let start = tokio::time::Instant::now();
        let result = self.inner.reply(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    source = %self.name,
                    duration_ms = %duration.as_millis(),
                    reply_chars = text.chars().count(),
                    "Reply produced"
                );
            }
            Err(e) => {
                tracing::error!(
                    source = %self.name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Reply failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
