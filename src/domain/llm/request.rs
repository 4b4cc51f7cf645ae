use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Valid range for sampling temperature
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);

/// Per-invocation overrides. Call-site values always win over profile `extra_params`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Dropped unless positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Provider-specific extras such as `lang` or `sessionId`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extras: IndexMap<String, serde_json::Value>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Positive max_tokens, or `None` when unset or invalid
    pub fn effective_max_tokens(&self) -> Option<i64> {
        self.max_tokens.filter(|v| *v > 0)
    }

    /// Non-blank system prompt
    pub fn effective_system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Reject caller-supplied values that are out of range
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(temperature) = self.temperature {
            let (min, max) = TEMPERATURE_RANGE;
            if !temperature.is_finite() || temperature < min || temperature > max {
                return Err(DomainError::validation(format!(
                    "Temperature must be between {} and {}, got {}",
                    min, max, temperature
                )));
            }
        }
        Ok(())
    }
}
