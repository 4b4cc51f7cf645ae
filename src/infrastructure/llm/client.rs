//! Per-profile client façade: one entry point for buffered and streamed calls

use std::collections::VecDeque;
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::family::{adapter_for, FamilyAdapter, LineOutcome, BUFFERED_TIMEOUT};
use super::http_client::{ByteStream, HttpClientTrait};
use super::line_decoder::LineDecoder;
use crate::domain::{
    CallOptions, CompletionResult, CredentialProvider, DomainError, EventStream, ProviderProfile,
    StreamEvent,
};

/// A request ready to go on the wire
struct PreparedRequest {
    headers: Vec<(String, String)>,
    payload: Value,
}

/// Client bound to one provider profile
#[derive(Debug)]
pub struct LlmClient {
    profile: Arc<ProviderProfile>,
    http_client: Arc<dyn HttpClientTrait>,
    credentials: Arc<dyn CredentialProvider>,
    adapter: &'static dyn FamilyAdapter,
}

impl LlmClient {
    pub fn new(
        profile: Arc<ProviderProfile>,
        http_client: Arc<dyn HttpClientTrait>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let adapter = adapter_for(profile.family());
        Self {
            profile,
            http_client,
            credentials,
            adapter,
        }
    }

    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    /// Run one call to completion and return the normalized result.
    ///
    /// With `streaming` the response is consumed incrementally and
    /// accumulated; a provider error mid-stream discards the partial text.
    pub async fn get_full_response(
        &self,
        prompt: &str,
        options: &CallOptions,
        streaming: bool,
    ) -> Result<CompletionResult, DomainError> {
        if streaming {
            let events = self.stream(prompt, options).await?;
            return collect_events(events).await;
        }

        let request = self.prepare(prompt, options, false).await?;

        info!(
            profile = %self.profile.id(),
            family = %self.profile.family(),
            "Sending buffered request"
        );

        let body = self
            .http_client
            .post_json(
                self.profile.endpoint(),
                &request.headers,
                &request.payload,
                BUFFERED_TIMEOUT,
            )
            .await?;

        let result = self.adapter.interpret_buffered(body)?;
        debug!(
            profile = %self.profile.id(),
            chars = result.text.chars().count(),
            references = result.references.len(),
            "Buffered response interpreted"
        );
        Ok(result)
    }

    /// Open a streamed call and return its events as they arrive.
    ///
    /// Heartbeats never reach the caller. A provider error event ends the
    /// stream with `Err`. Dropping the stream closes the connection.
    pub async fn stream(&self, prompt: &str, options: &CallOptions) -> Result<EventStream, DomainError> {
        let request = self.prepare(prompt, options, true).await?;
        let timeout = self.adapter.stream_timeout();

        info!(
            profile = %self.profile.id(),
            family = %self.profile.family(),
            timeout_secs = timeout.as_secs(),
            "Opening stream"
        );

        let bytes = self
            .http_client
            .post_json_stream(self.profile.endpoint(), &request.headers, &request.payload, timeout)
            .await?;

        let state = StreamState::new(bytes, self.adapter);
        let events = stream::unfold(state, |mut state| async move {
            state.next_event().await.map(|event| (event, state))
        });

        Ok(Box::pin(events))
    }

    async fn prepare(
        &self,
        prompt: &str,
        options: &CallOptions,
        streaming: bool,
    ) -> Result<PreparedRequest, DomainError> {
        options.validate()?;

        let credential = self
            .credentials
            .get_credential(self.profile.credential_ref())
            .await?;

        let accept = if streaming {
            "text/event-stream"
        } else {
            "application/json"
        };
        let headers = vec![
            self.profile.auth().header(credential.secret()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), accept.to_string()),
        ];

        let mut payload = self.adapter.build_payload(&self.profile, prompt, options);
        if let Value::Object(map) = &mut payload {
            map.insert("stream".to_string(), Value::Bool(streaming));
        }

        Ok(PreparedRequest { headers, payload })
    }
}

/// Fold a live event stream into one result
async fn collect_events(mut events: EventStream) -> Result<CompletionResult, DomainError> {
    let mut result = CompletionResult::default();

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::TextFragment(fragment) => result.push_text(&fragment),
            StreamEvent::ReferenceSet {
                references,
                result_id,
            } => {
                result.references = references;
                if result_id.is_some() {
                    result.result_id = result_id;
                }
            }
            StreamEvent::QueryMeta {
                keywords,
                session_id,
            } => {
                result.keywords = keywords;
                if session_id.is_some() {
                    result.session_id = session_id;
                }
            }
            StreamEvent::Error { code, message } => {
                return Err(DomainError::provider_code("stream", code, message));
            }
            StreamEvent::Heartbeat => {}
        }
    }

    Ok(result)
}

/// Pull-driven decoding state behind an [`EventStream`]
struct StreamState {
    bytes: Option<ByteStream>,
    decoder: LineDecoder,
    pending: VecDeque<String>,
    adapter: &'static dyn FamilyAdapter,
    finished: bool,
}

impl StreamState {
    fn new(bytes: ByteStream, adapter: &'static dyn FamilyAdapter) -> Self {
        Self {
            bytes: Some(bytes),
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            adapter,
            finished: false,
        }
    }

    async fn next_event(&mut self) -> Option<Result<StreamEvent, DomainError>> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(line) = self.pending.pop_front() {
                match self.adapter.interpret_line(&line) {
                    LineOutcome::Skip | LineOutcome::Event(StreamEvent::Heartbeat) => continue,
                    LineOutcome::Done => {
                        debug!("Stream finished with sentinel");
                        self.close();
                        return None;
                    }
                    LineOutcome::Event(StreamEvent::Error { code, message }) => {
                        warn!(code = ?code, message = %message, "Provider reported a stream error");
                        self.close();
                        return Some(Err(DomainError::provider_code(
                            self.adapter.family().as_str(),
                            code,
                            message,
                        )));
                    }
                    LineOutcome::Event(event) => return Some(Ok(event)),
                }
            }

            let Some(bytes) = self.bytes.as_mut() else {
                self.finished = true;
                return None;
            };

            match bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = self.decoder.push(&chunk);
                    self.pending.extend(lines);
                }
                Some(Err(e)) => {
                    self.close();
                    return Some(Err(e));
                }
                None => {
                    self.bytes = None;
                    self.pending.extend(self.decoder.finish());
                }
            }
        }
    }

    /// Stop yielding and release the connection
    fn close(&mut self) {
        self.finished = true;
        self.bytes = None;
        self.pending.clear();
    }
}
