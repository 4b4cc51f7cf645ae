use chrono::{DateTime, Utc};

/// A resolved secret together with the reference it was resolved from
#[derive(Clone)]
pub struct Credential {
    credential_ref: String,
    secret: String,
    fetched_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(credential_ref: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            credential_ref: credential_ref.into(),
            secret: secret.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn credential_ref(&self) -> &str {
        &self.credential_ref
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

// The secret must never reach a log line through `{:?}`.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("credential_ref", &self.credential_ref)
            .field("secret", &"***")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

/// Mask a header value down to its auth scheme prefix.
///
/// `Bearer sk-abc` becomes `Bearer ***`; a bare secret becomes `***`.
pub fn mask_secret(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) if !scheme.is_empty() => format!("{} ***", scheme),
        _ => "***".to_string(),
    }
}
