//! Fixed reply used by the demo widget

use super::{ReplyError, ReplySource};
use async_trait::async_trait;

/// Reply shown after every user message of the demo widget
pub const DEFAULT_CANNED_REPLY: &str =
    "شكراً لك على سؤالك! سأقوم بالرد عليك في أقرب وقت ممكن. هل هناك أي شيء آخر يمكنني مساعدتك فيه؟";

/// Always answers with the same text, regardless of the prompt
#[derive(Debug, Clone)]
pub struct CannedReply {
    text: String,
}

impl CannedReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedReply {
    fn default() -> Self {
        Self::new(DEFAULT_CANNED_REPLY)
    }
}

#[async_trait]
impl ReplySource for CannedReply {
    async fn reply(&self, _prompt: &str) -> Result<String, ReplyError> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}
