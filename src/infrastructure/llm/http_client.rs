use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use tracing::debug;

use super::request_log::RequestLogger;
use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST a JSON body and return the whole parsed response.
    ///
    /// A 2xx body that is not JSON comes back as `Value::String` with the raw text.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, DomainError>;

    /// POST a JSON body and hand back the response body as it arrives
    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest.
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    logger: RequestLogger,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            logger: RequestLogger::default(),
        }
    }

    pub fn with_request_log(mut self, logger: RequestLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Send the request and check the status. `deadline` bounds the whole
    /// exchange, body included, and is left unset for streamed calls.
    async fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        deadline: Option<Duration>,
    ) -> Result<reqwest::Response, DomainError> {
        self.logger.record("POST", url, headers, body).await;

        let mut request = self.client.post(url);
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.json(body).send().await.map_err(|e| match deadline {
            Some(deadline) => map_request_error(e, deadline),
            None => DomainError::transport(format!("Request failed: {}", e)),
        })?;

        let status = response.status();
        debug!(endpoint = %url, status = %status, "Response received");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::http_status(status.as_u16(), error_body));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_request_error(e: reqwest::Error, timeout: Duration) -> DomainError {
    if e.is_timeout() {
        DomainError::transport(format!("Request timed out after {:?}", timeout))
    } else {
        DomainError::transport(format!("Request failed: {}", e))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(url, headers, body, Some(timeout)).await?;

        let text = response
            .text()
            .await
            .map_err(|e| map_request_error(e, timeout))?;

        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<ByteStream, DomainError> {
        let response = tokio::time::timeout(timeout, self.send(url, headers, body, None))
            .await
            .map_err(|_| {
                DomainError::transport(format!("Request timed out after {:?}", timeout))
            })??;

        // Idle timeout: each read must complete within `timeout`
        let chunks = Box::pin(response.bytes_stream());
        let stream = stream::unfold(Some(chunks), move |chunks| async move {
            let mut chunks = chunks?;
            match tokio::time::timeout(timeout, chunks.next()).await {
                Ok(Some(Ok(bytes))) => Some((Ok(bytes), Some(chunks))),
                Ok(Some(Err(e))) => Some((
                    Err(DomainError::transport(format!("Stream error: {}", e))),
                    None,
                )),
                Ok(None) => None,
                Err(_) => Some((
                    Err(DomainError::transport(format!(
                        "Stream timed out after {:?} without data",
                        timeout
                    ))),
                    None,
                )),
            }
        });

        Ok(Box::pin(stream))
    }
}
