//! Reply error types

use thiserror::Error;

/// Reply error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ReplyError {
    pub kind: ReplyErrorKind,
    pub message: String,
}

impl ReplyError {
    pub fn new(kind: ReplyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ReplyErrorKind::Timeout, message)
    }
}

/// Error classification for reply failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyErrorKind {
    /// Reply did not arrive within the configured timeout
    Timeout,
    /// Backend unreachable or refused the request
    #[allow(dead_code)] // Only network-backed sources produce this
    Unavailable,
}
