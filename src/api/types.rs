//! API request and response types

use crate::runtime::WidgetSnapshot;
use serde::{Deserialize, Serialize};

/// Composer submission (JSON body or form field)
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: String,
}

/// Response for chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// False when the input was blank and nothing happened
    pub queued: bool,
}

/// Response with a widget snapshot
#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    pub widget: WidgetSnapshot,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
