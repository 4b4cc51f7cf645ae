use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use super::Credential;
use crate::domain::DomainError;

/// Resolves a profile's `credential_ref` to its secret value
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug {
    /// Resolve a credential reference, failing with a configuration error when absent
    async fn get_credential(&self, credential_ref: &str) -> Result<Credential, DomainError>;

    /// Check if this provider can resolve the given reference
    async fn supports(&self, credential_ref: &str) -> bool;

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}

/// In-memory credential provider for embedding callers and tests
#[derive(Default)]
pub struct StaticCredentialProvider {
    secrets: HashMap<String, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, credential_ref: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(credential_ref.into(), secret.into());
        self
    }
}

impl Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut refs: Vec<&String> = self.secrets.keys().collect();
        refs.sort();
        f.debug_struct("StaticCredentialProvider")
            .field("refs", &refs)
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn get_credential(&self, credential_ref: &str) -> Result<Credential, DomainError> {
        self.secrets
            .get(credential_ref)
            .map(|secret| Credential::new(credential_ref, secret.clone()))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Secret '{}' is not configured",
                    credential_ref
                ))
            })
    }

    async fn supports(&self, credential_ref: &str) -> bool {
        self.secrets.contains_key(credential_ref)
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}
