//! Provider-family dispatch table.
//!
//! Each family supplies its own payload builder and response interpreter.
//! Adding a family means adding a variant and one adapter.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::chat::ChatAdapter;
use super::search::SearchAdapter;
use crate::domain::llm::coerce_param;
use crate::domain::{CallOptions, CompletionResult, DomainError, ProviderFamily, ProviderProfile, StreamEvent};

/// Timeout for buffered calls of every family
pub const BUFFERED_TIMEOUT: Duration = Duration::from_secs(60);

/// What a single line of a streaming body means
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Event(StreamEvent),
    /// Blank line, comment or unparseable noise
    Skip,
    /// End-of-stream sentinel
    Done,
}

/// Payload shaping and response interpretation for one provider family
pub trait FamilyAdapter: Send + Sync + std::fmt::Debug {
    fn family(&self) -> ProviderFamily;

    /// Build the wire payload, without the transport-level `stream` flag
    fn build_payload(&self, profile: &ProviderProfile, prompt: &str, options: &CallOptions) -> Value;

    /// Connection lifetime for streamed calls
    fn stream_timeout(&self) -> Duration;

    fn interpret_buffered(&self, body: Value) -> Result<CompletionResult, DomainError>;

    fn interpret_line(&self, line: &str) -> LineOutcome;
}

/// Look up the adapter for a family
pub fn adapter_for(family: ProviderFamily) -> &'static dyn FamilyAdapter {
    match family {
        ProviderFamily::Chat => &ChatAdapter,
        ProviderFamily::Search => &SearchAdapter,
    }
}

/// Merge `params` into `payload`, skipping keys that are already set
pub(crate) fn merge_params(payload: &mut Map<String, Value>, params: &IndexMap<String, Value>) {
    for (key, value) in params {
        if payload.contains_key(key) {
            continue;
        }
        if let Some(value) = coerce_param(key, value) {
            payload.insert(key.clone(), value);
        }
    }
}

/// Strip an optional SSE `data:` prefix and surrounding whitespace
pub(crate) fn strip_data_prefix(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("data:").map(str::trim).unwrap_or(line)
}

/// Read an integer that may arrive as a number or a numeric string
pub(crate) fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an identifier that may arrive as a number or a string
pub(crate) fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
