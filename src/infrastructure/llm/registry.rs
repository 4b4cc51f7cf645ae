//! Profile-keyed client registry with create-on-first-use semantics

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::client::LlmClient;
use super::http_client::{HttpClient, HttpClientTrait};
use super::request_log::RequestLogger;
use crate::config::AppConfig;
use crate::domain::{
    CallOptions, CompletionResult, CredentialProvider, DomainError, EventStream, ProfileCatalog,
    ProviderProfile,
};
use crate::infrastructure::credentials::EnvCredentialProvider;

/// Outcome of [`ClientRegistry::call`]
pub enum CallOutput {
    Complete(CompletionResult),
    Stream(EventStream),
}

impl std::fmt::Debug for CallOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(result) => f.debug_tuple("Complete").field(result).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Owns the profile catalog and one client per profile
#[derive(Debug)]
pub struct ClientRegistry {
    catalog: Arc<ProfileCatalog>,
    http_client: Arc<dyn HttpClientTrait>,
    credentials: Arc<dyn CredentialProvider>,
    clients: RwLock<HashMap<String, Arc<LlmClient>>>,
}

impl ClientRegistry {
    pub fn new(
        catalog: ProfileCatalog,
        http_client: Arc<dyn HttpClientTrait>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            http_client,
            credentials,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Build a registry backed by reqwest and environment-variable secrets
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let catalog = config.catalog()?;
        let http_client = HttpClient::new()
            .with_request_log(RequestLogger::from_config(&config.request_log));

        info!(profiles = catalog.len(), "Client registry initialized");

        Ok(Self::new(
            catalog,
            Arc::new(http_client),
            Arc::new(EnvCredentialProvider::new()),
        ))
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Configured profiles in declaration order
    pub fn list_profiles(&self) -> &[Arc<ProviderProfile>] {
        self.catalog.list()
    }

    /// Client for a profile, or for the default profile when `profile_id` is `None`
    pub async fn client(&self, profile_id: Option<&str>) -> Result<Arc<LlmClient>, DomainError> {
        let profile = self.catalog.resolve(profile_id)?;

        if let Some(client) = self.clients.read().await.get(profile.id()) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        let client = clients
            .entry(profile.id().to_string())
            .or_insert_with(|| {
                debug!(profile = %profile.id(), family = %profile.family(), "Creating client");
                Arc::new(LlmClient::new(
                    profile.clone(),
                    self.http_client.clone(),
                    self.credentials.clone(),
                ))
            })
            .clone();

        Ok(client)
    }

    /// Single entry point: either a finished result or a live event stream
    pub async fn call(
        &self,
        profile_id: Option<&str>,
        prompt: &str,
        options: &CallOptions,
        streaming: bool,
    ) -> Result<CallOutput, DomainError> {
        let client = self.client(profile_id).await?;

        if streaming {
            client.stream(prompt, options).await.map(CallOutput::Stream)
        } else {
            client
                .get_full_response(prompt, options, false)
                .await
                .map(CallOutput::Complete)
        }
    }

    /// Run a call to completion, consuming the stream internally when `streaming`
    pub async fn get_full_response(
        &self,
        profile_id: Option<&str>,
        prompt: &str,
        options: &CallOptions,
        streaming: bool,
    ) -> Result<CompletionResult, DomainError> {
        self.client(profile_id)
            .await?
            .get_full_response(prompt, options, streaming)
            .await
    }

    /// Number of clients created so far
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProfileConfig, StaticCredentialProvider, StreamEvent};
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use futures::StreamExt;
    use serde_json::json;

    fn catalog() -> ProfileCatalog {
        ProfileCatalog::from_configs(
            vec![
                ProfileConfig::chat(
                    "openai",
                    "https://api.openai.com/v1/chat/completions",
                    "OPENAI_API_KEY",
                    "gpt-4o-mini",
                ),
                ProfileConfig::search(
                    "metaso",
                    "https://metaso.cn/api/open/search/v2",
                    "METASO_KEY",
                    "question",
                ),
            ],
            Some("metaso".to_string()),
        )
        .unwrap()
    }

    fn registry(http: Arc<MockHttpClient>) -> ClientRegistry {
        ClientRegistry::new(
            catalog(),
            http,
            Arc::new(
                StaticCredentialProvider::new()
                    .with_secret("OPENAI_API_KEY", "sk-test")
                    .with_secret("METASO_KEY", "mk-test"),
            ),
        )
    }

    #[tokio::test]
    async fn test_list_profiles_in_order() {
        let registry = registry(Arc::new(MockHttpClient::new()));
        let ids: Vec<&str> = registry.list_profiles().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["openai", "metaso"]);
    }

    #[tokio::test]
    async fn test_clients_created_once_per_profile() {
        let registry = registry(Arc::new(MockHttpClient::new()));
        assert_eq!(registry.client_count().await, 0);

        let first = registry.client(Some("openai")).await.unwrap();
        let second = registry.client(Some("openai")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let default = registry.client(None).await.unwrap();
        assert_eq!(default.profile().id(), "metaso");
        assert_eq!(registry.client_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_profile_is_configuration_error() {
        let http = Arc::new(MockHttpClient::new());
        let registry = registry(http.clone());

        let err = registry
            .get_full_response(Some("nope"), "Hi", &CallOptions::new(), false)
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_call_buffered_returns_complete() {
        let http = Arc::new(MockHttpClient::new().with_response(json!({
            "choices": [{"message": {"content": "Hello"}}]
        })));
        let registry = registry(http);

        let output = registry
            .call(Some("openai"), "Hi", &CallOptions::new(), false)
            .await
            .unwrap();

        match output {
            CallOutput::Complete(result) => assert_eq!(result.text, "Hello"),
            other => panic!("expected complete result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_streaming_returns_events() {
        let http = Arc::new(MockHttpClient::new().with_stream_body(
            "{\"type\":\"append-text\",\"text\":\"a\"}\n{\"type\":\"append-text\",\"text\":\"b\"}\n",
        ));
        let registry = registry(http);

        let output = registry
            .call(None, "q", &CallOptions::new(), true)
            .await
            .unwrap();

        let CallOutput::Stream(events) = output else {
            panic!("expected a stream");
        };
        let events: Vec<StreamEvent> = events.map(|e| e.unwrap()).collect().await;
        assert_eq!(events, vec![StreamEvent::text("a"), StreamEvent::text("b")]);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_client() {
        let http = Arc::new(MockHttpClient::new().with_response(json!({
            "choices": [{"message": {"content": "ok"}}]
        })));
        let registry = Arc::new(registry(http.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry
                        .get_full_response(Some("openai"), &format!("prompt {}", i), &CallOptions::new(), false)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().text, "ok");
        }

        assert_eq!(registry.client_count().await, 1);
        assert_eq!(http.requests().len(), 8);
    }

    #[test]
    fn test_from_config_rejects_invalid_profiles() {
        let config = AppConfig {
            profiles: vec![ProfileConfig::chat("", "https://a.example", "K", "m")],
            ..AppConfig::default()
        };

        let err = ClientRegistry::from_config(&config).unwrap_err();
        assert!(err.is_configuration());
    }
}
