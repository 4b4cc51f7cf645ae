use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

use crate::domain::{Credential, CredentialProvider, DomainError};

/// Credential provider that reads from environment variables.
///
/// A credential reference names the variable to read. Aliases let a
/// reference fall back to further variables, tried in insertion order.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider {
    aliases: HashMap<String, Vec<String>>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also try `env_var` when the variable named by `credential_ref` is unset
    pub fn with_alias(mut self, credential_ref: impl Into<String>, env_var: impl Into<String>) -> Self {
        self.aliases
            .entry(credential_ref.into())
            .or_default()
            .push(env_var.into());
        self
    }

    fn candidates<'a>(&'a self, credential_ref: &'a str) -> impl Iterator<Item = &'a str> {
        std::iter::once(credential_ref).chain(
            self.aliases
                .get(credential_ref)
                .into_iter()
                .flatten()
                .map(String::as_str),
        )
    }

    fn read_credential(&self, credential_ref: &str) -> Result<Credential, DomainError> {
        self.candidates(credential_ref)
            .find_map(|var| env::var(var).ok().filter(|value| !value.trim().is_empty()))
            .map(|secret| Credential::new(credential_ref, secret))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Environment variable '{}' is not set",
                    credential_ref
                ))
            })
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn get_credential(&self, credential_ref: &str) -> Result<Credential, DomainError> {
        self.read_credential(credential_ref)
    }

    async fn supports(&self, credential_ref: &str) -> bool {
        self.read_credential(credential_ref).is_ok()
    }

    fn provider_name(&self) -> &'static str {
        "env"
    }
}
