//! Profile entity and related types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::validation::{validate_profile_config, ProfileValidationError};

/// Wire-protocol shape a backend expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// OpenAI-compatible chat completions
    Chat,
    /// Question/answer search endpoint with citations
    Search,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Search => "search",
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the resolved secret is attached to outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <secret>`
    #[default]
    Bearer,
    /// `secret-key: <secret>`
    SecretKey,
}

impl AuthScheme {
    pub fn header(&self, secret: &str) -> (String, String) {
        match self {
            Self::Bearer => ("Authorization".to_string(), format!("Bearer {}", secret)),
            Self::SecretKey => ("secret-key".to_string(), secret.to_string()),
        }
    }
}

/// Raw profile as written by an operator in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub endpoint: String,
    pub credential_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra_params: IndexMap<String, serde_json::Value>,
    /// Payload field carrying the query text; its presence selects the search family
    #[serde(
        default,
        alias = "question_field_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub question_field: Option<String>,
    #[serde(default)]
    pub auth: AuthScheme,
}

impl ProfileConfig {
    pub fn chat(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        credential_ref: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            endpoint: endpoint.into(),
            credential_ref: credential_ref.into(),
            model: Some(model.into()),
            extra_params: IndexMap::new(),
            question_field: None,
            auth: AuthScheme::Bearer,
        }
    }

    pub fn search(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        credential_ref: impl Into<String>,
        question_field: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            endpoint: endpoint.into(),
            credential_ref: credential_ref.into(),
            model: None,
            extra_params: IndexMap::new(),
            question_field: Some(question_field.into()),
            auth: AuthScheme::Bearer,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A validated, immutable provider profile
#[derive(Debug, Clone, Serialize)]
pub struct ProviderProfile {
    id: String,
    name: String,
    endpoint: String,
    family: ProviderFamily,
    credential_ref: String,
    model: Option<String>,
    extra_params: IndexMap<String, serde_json::Value>,
    question_field: Option<String>,
    auth: AuthScheme,
}

impl ProviderProfile {
    /// Validate a raw profile and derive its family
    pub fn from_config(config: ProfileConfig) -> Result<Self, ProfileValidationError> {
        let family = validate_profile_config(&config)?;
        let name = config
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| config.id.trim().to_string());

        Ok(Self {
            id: config.id.trim().to_string(),
            name,
            endpoint: config.endpoint.trim().to_string(),
            family,
            credential_ref: config.credential_ref,
            model: config.model.filter(|m| !m.trim().is_empty()),
            extra_params: config.extra_params,
            question_field: config.question_field.map(|f| f.trim().to_string()),
            auth: config.auth,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    pub fn credential_ref(&self) -> &str {
        &self.credential_ref
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn extra_params(&self) -> &IndexMap<String, serde_json::Value> {
        &self.extra_params
    }

    pub fn question_field(&self) -> Option<&str> {
        self.question_field.as_deref()
    }

    pub fn auth(&self) -> AuthScheme {
        self.auth
    }
}
