//! OpenAI-compatible chat completion family

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::trace;

use super::family::{merge_params, strip_data_prefix, FamilyAdapter, LineOutcome};
use crate::domain::llm::coerce_param;
use crate::domain::{CallOptions, CompletionResult, DomainError, ProviderFamily, ProviderProfile, StreamEvent};

const STREAM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatAdapter;

impl FamilyAdapter for ChatAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Chat
    }

    fn build_payload(&self, profile: &ProviderProfile, prompt: &str, options: &CallOptions) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.effective_system_prompt() {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let mut payload = Map::new();
        payload.insert("model".to_string(), json!(profile.model().unwrap_or_default()));
        payload.insert("messages".to_string(), Value::Array(messages));

        if let Some(temperature) = options
            .temperature
            .and_then(|t| coerce_param("temperature", &json!(t)))
        {
            payload.insert("temperature".to_string(), temperature);
        }

        if let Some(max_tokens) = options.effective_max_tokens() {
            payload.insert("max_tokens".to_string(), json!(max_tokens));
        }

        merge_params(&mut payload, &options.extras);
        merge_params(&mut payload, profile.extra_params());

        Value::Object(payload)
    }

    fn stream_timeout(&self) -> Duration {
        STREAM_TIMEOUT
    }

    fn interpret_buffered(&self, body: Value) -> Result<CompletionResult, DomainError> {
        if let Some(content) = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
        {
            return Ok(CompletionResult::new(content));
        }

        if let Some(content) = body.get("content").and_then(Value::as_str) {
            return Ok(CompletionResult::new(content));
        }

        // Unknown success shape: hand back the raw response rather than nothing
        let raw = match body {
            Value::String(text) => text,
            other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
        };
        Ok(CompletionResult::new(raw))
    }

    fn interpret_line(&self, line: &str) -> LineOutcome {
        let data = strip_data_prefix(line);
        if data.is_empty() {
            return LineOutcome::Skip;
        }
        if data == "[DONE]" {
            return LineOutcome::Done;
        }

        let Ok(chunk) = serde_json::from_str::<Value>(data) else {
            trace!(line = %data, "Skipping non-JSON stream line");
            return LineOutcome::Skip;
        };

        let has_choices = chunk
            .get("choices")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty());

        let content = if has_choices {
            chunk.pointer("/choices/0/delta/content").and_then(Value::as_str)
        } else {
            chunk.get("content").and_then(Value::as_str)
        };

        match content {
            Some(text) if !text.is_empty() => LineOutcome::Event(StreamEvent::text(text)),
            _ => LineOutcome::Skip,
        }
    }
}
