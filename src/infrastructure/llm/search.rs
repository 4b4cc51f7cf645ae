//! Search/answer family: a question field in, text plus citations out

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{debug, trace, warn};

use super::family::{lenient_i64, lenient_string, merge_params, strip_data_prefix, FamilyAdapter, LineOutcome};
use crate::domain::{CallOptions, CompletionResult, DomainError, ProviderFamily, ProviderProfile, Reference, StreamEvent};

/// Longest question the search family accepts, in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

const STREAM_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_QUESTION_FIELD: &str = "question";
const LEGACY_ERROR_PREFIX: &str = "ERROR:";

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchAdapter;

impl SearchAdapter {
    fn provider_error(code: Option<i64>, message: impl Into<String>) -> DomainError {
        DomainError::provider_code(ProviderFamily::Search.as_str(), code, message)
    }
}

impl FamilyAdapter for SearchAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Search
    }

    fn build_payload(&self, profile: &ProviderProfile, prompt: &str, options: &CallOptions) -> Value {
        if options.temperature.is_some()
            || options.max_tokens.is_some()
            || options.effective_system_prompt().is_some()
        {
            debug!(profile = %profile.id(), "Ignoring chat-only options for search profile");
        }

        let field = profile.question_field().unwrap_or(DEFAULT_QUESTION_FIELD);

        let mut payload = Map::new();
        payload.insert(field.to_string(), json!(truncate_question(prompt)));

        merge_params(&mut payload, &options.extras);
        merge_params(&mut payload, profile.extra_params());

        Value::Object(payload)
    }

    fn stream_timeout(&self) -> Duration {
        STREAM_TIMEOUT
    }

    fn interpret_buffered(&self, body: Value) -> Result<CompletionResult, DomainError> {
        let code = lenient_i64(body.get("errCode"));
        if code != Some(0) {
            let message = body
                .get("errMsg")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Unknown error");
            return Err(Self::provider_error(code, message));
        }

        let data = body.get("data").cloned().unwrap_or(Value::Null);
        let text = data
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut result =
            CompletionResult::new(text).with_references(parse_references(data.get("references")));
        result.session_id = lenient_string(data.get("sessionId"));
        result.result_id = lenient_string(data.get("resultId").or_else(|| data.get("id")));
        Ok(result)
    }

    fn interpret_line(&self, line: &str) -> LineOutcome {
        let data = strip_data_prefix(line);
        if data.is_empty() {
            return LineOutcome::Skip;
        }
        if data == "[DONE]" {
            return LineOutcome::Done;
        }
        if let Some(rest) = data.strip_prefix(LEGACY_ERROR_PREFIX) {
            let (code, message) = split_legacy_error(rest.trim());
            warn!(code = ?code, message = %message, "Provider sent an unframed error line");
            return LineOutcome::Event(StreamEvent::error(code, message));
        }

        let Ok(message) = serde_json::from_str::<Value>(data) else {
            trace!(line = %data, "Skipping non-JSON stream line");
            return LineOutcome::Skip;
        };

        match message.get("type").and_then(Value::as_str) {
            Some("append-text") => match message.get("text").and_then(Value::as_str) {
                Some(text) if !text.is_empty() => LineOutcome::Event(StreamEvent::text(text)),
                _ => LineOutcome::Skip,
            },
            Some("set-reference") => LineOutcome::Event(StreamEvent::ReferenceSet {
                references: parse_references(message.get("list")),
                result_id: lenient_string(message.get("resultId")),
            }),
            Some("query") => {
                let keywords = message
                    .get("data")
                    .and_then(Value::as_array)
                    .map(|words| {
                        words
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                LineOutcome::Event(StreamEvent::QueryMeta {
                    keywords,
                    session_id: lenient_string(message.get("sessionId")),
                })
            }
            Some("error") => {
                let message_text = message
                    .get("msg")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("Unknown error");
                LineOutcome::Event(StreamEvent::error(
                    lenient_i64(message.get("code")),
                    message_text,
                ))
            }
            Some("heartbeat") => LineOutcome::Event(StreamEvent::Heartbeat),
            other => {
                trace!(event_type = ?other, "Skipping unrecognised stream event");
                LineOutcome::Skip
            }
        }
    }
}

/// Keep at most [`MAX_QUESTION_CHARS`] characters of the prompt
pub fn truncate_question(prompt: &str) -> &str {
    match prompt.char_indices().nth(MAX_QUESTION_CHARS) {
        Some((cut, _)) => &prompt[..cut],
        None => prompt,
    }
}

/// Parse a provider reference list, numbering entries by position when the index is unusable
pub fn parse_references(list: Option<&Value>) -> Vec<Reference> {
    let Some(entries) = list.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let index = lenient_i64(entry.get("index"))
                .and_then(|i| u32::try_from(i).ok())
                .unwrap_or(position as u32 + 1);
            let title = entry.get("title").and_then(Value::as_str).unwrap_or_default();
            let link = entry
                .get("link")
                .or_else(|| entry.get("url"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            Reference::new(index, title, link)
        })
        .collect()
}

/// Split `message (code N)` into its parts
fn split_legacy_error(rest: &str) -> (Option<i64>, String) {
    if let Some(open) = rest.rfind("(code ") {
        if let Some(inner) = rest[open + 6..].strip_suffix(')') {
            if let Ok(code) = inner.trim().parse() {
                return (Some(code), rest[..open].trim().to_string());
            }
        }
    }

    let message = if rest.is_empty() { "Unknown error" } else { rest };
    (None, message.to_string())
}
