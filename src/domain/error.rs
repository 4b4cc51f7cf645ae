use thiserror::Error;

/// Errors surfaced by the client to its callers
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Transport error: {}", format_transport(*status, message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Provider error: {provider} - {}", format_provider(*code, message))]
    Provider {
        provider: String,
        code: Option<i64>,
        message: String,
    },
}

fn format_transport(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP {}: {}", status, message),
        None => message.to_string(),
    }
}

fn format_provider(code: Option<i64>, message: &str) -> String {
    match code {
        Some(code) => format!("{} (code {})", message, code),
        None => message.to_string(),
    }
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            code: None,
            message: message.into(),
        }
    }

    pub fn provider_code(
        provider: impl Into<String>,
        code: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            code,
            message: message.into(),
        }
    }

    /// True for errors raised before any network I/O took place
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Validation { .. })
    }

    /// HTTP status carried by a transport error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Application-level code carried by a provider error
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Provider { code, .. } => *code,
            _ => None,
        }
    }
}
