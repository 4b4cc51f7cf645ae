//! Profile validation utilities

use std::fmt;

use super::entity::{ProfileConfig, ProviderFamily};
use crate::domain::DomainError;

/// Profile validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileValidationError {
    /// Profile ID is empty
    EmptyId,
    /// Endpoint is empty
    EmptyEndpoint { id: String },
    /// Endpoint is not an absolute http(s) URL
    InvalidEndpoint { id: String, endpoint: String },
    /// Credential reference is empty
    EmptyCredentialRef { id: String },
    /// Question field is set but blank
    EmptyQuestionField { id: String },
    /// Chat profile without a model
    MissingModel { id: String },
    /// Both a model and a question field are set
    AmbiguousFamily { id: String },
    /// Two profiles share an ID
    DuplicateId { id: String },
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Profile ID cannot be empty"),
            Self::EmptyEndpoint { id } => write!(f, "Profile '{}' has an empty endpoint", id),
            Self::InvalidEndpoint { id, endpoint } => write!(
                f,
                "Profile '{}' endpoint '{}' is not an absolute http(s) URL",
                id, endpoint
            ),
            Self::EmptyCredentialRef { id } => {
                write!(f, "Profile '{}' has an empty credential_ref", id)
            }
            Self::EmptyQuestionField { id } => {
                write!(f, "Profile '{}' has an empty question_field", id)
            }
            Self::MissingModel { id } => write!(
                f,
                "Profile '{}' is a chat profile and requires a model",
                id
            ),
            Self::AmbiguousFamily { id } => write!(
                f,
                "Profile '{}' sets both model and question_field; set only one",
                id
            ),
            Self::DuplicateId { id } => write!(f, "Profile ID '{}' is defined more than once", id),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

impl From<ProfileValidationError> for DomainError {
    fn from(err: ProfileValidationError) -> Self {
        DomainError::configuration(err.to_string())
    }
}

/// Validate a raw profile and return the family it belongs to
pub fn validate_profile_config(
    config: &ProfileConfig,
) -> Result<ProviderFamily, ProfileValidationError> {
    let id = config.id.trim();
    if id.is_empty() {
        return Err(ProfileValidationError::EmptyId);
    }
    let id = id.to_string();

    let endpoint = config.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ProfileValidationError::EmptyEndpoint { id });
    }

    let is_absolute_http = reqwest::Url::parse(endpoint)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !is_absolute_http {
        return Err(ProfileValidationError::InvalidEndpoint {
            id,
            endpoint: endpoint.to_string(),
        });
    }

    if config.credential_ref.trim().is_empty() {
        return Err(ProfileValidationError::EmptyCredentialRef { id });
    }

    let has_model = config
        .model
        .as_deref()
        .is_some_and(|m| !m.trim().is_empty());

    match config.question_field.as_deref() {
        Some(field) if field.trim().is_empty() => {
            Err(ProfileValidationError::EmptyQuestionField { id })
        }
        Some(_) if has_model => Err(ProfileValidationError::AmbiguousFamily { id }),
        Some(_) => Ok(ProviderFamily::Search),
        None if !has_model => Err(ProfileValidationError::MissingModel { id }),
        None => Ok(ProviderFamily::Chat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://api.example.com/v1/chat/completions";

    #[test]
    fn test_valid_chat_and_search() {
        let chat = ProfileConfig::chat("chat", ENDPOINT, "KEY", "gpt-4o");
        let search = ProfileConfig::search("search", ENDPOINT, "KEY", "question");

        assert_eq!(validate_profile_config(&chat), Ok(ProviderFamily::Chat));
        assert_eq!(validate_profile_config(&search), Ok(ProviderFamily::Search));
    }

    #[test]
    fn test_empty_id() {
        let config = ProfileConfig::chat("  ", ENDPOINT, "KEY", "gpt-4o");
        assert_eq!(
            validate_profile_config(&config),
            Err(ProfileValidationError::EmptyId)
        );
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let config = ProfileConfig::chat("chat", "/v1/chat", "KEY", "gpt-4o");
        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::InvalidEndpoint { .. })
        ));

        let config = ProfileConfig::chat("chat", "ftp://example.com/x", "KEY", "gpt-4o");
        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_empty_credential_ref() {
        let config = ProfileConfig::chat("chat", ENDPOINT, "", "gpt-4o");
        assert_eq!(
            validate_profile_config(&config),
            Err(ProfileValidationError::EmptyCredentialRef {
                id: "chat".to_string()
            })
        );
    }

    #[test]
    fn test_chat_requires_model() {
        let mut config = ProfileConfig::chat("chat", ENDPOINT, "KEY", "");
        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::MissingModel { .. })
        ));

        config.model = None;
        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::MissingModel { .. })
        ));
    }

    #[test]
    fn test_model_and_question_field_is_ambiguous() {
        let mut config = ProfileConfig::search("both", ENDPOINT, "KEY", "question");
        config.model = Some("gpt-4o".to_string());

        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::AmbiguousFamily { .. })
        ));
    }

    #[test]
    fn test_blank_question_field() {
        let config = ProfileConfig::search("search", ENDPOINT, "KEY", " ");
        assert!(matches!(
            validate_profile_config(&config),
            Err(ProfileValidationError::EmptyQuestionField { .. })
        ));
    }

    #[test]
    fn test_converts_to_configuration_error() {
        let err: DomainError = ProfileValidationError::EmptyId.into();
        assert!(err.is_configuration());
    }
}
