use std::pin::Pin;

use futures::Stream;

use super::Reference;
use crate::domain::DomainError;

/// Incremental sequence of events from a streamed call
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, DomainError>> + Send>>;

/// One interpreted event of a streaming response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Generated text to append
    TextFragment(String),
    /// Replaces any previously received reference list
    ReferenceSet {
        references: Vec<Reference>,
        result_id: Option<String>,
    },
    /// Search query metadata
    QueryMeta {
        keywords: Vec<String>,
        session_id: Option<String>,
    },
    /// Provider-signalled failure; terminates the stream
    Error { code: Option<i64>, message: String },
    /// Keep-alive, never delivered to callers
    Heartbeat,
}

impl StreamEvent {
    pub fn text(fragment: impl Into<String>) -> Self {
        Self::TextFragment(fragment.into())
    }

    pub fn error(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Heartbeat)
    }

    /// Text carried by a fragment event
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::TextFragment(text) => Some(text),
            _ => None,
        }
    }
}
