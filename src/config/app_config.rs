use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{DomainError, ProfileCatalog, ProfileConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub request_log: RequestLogConfig,
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Outbound request echo and persistence
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RequestLogConfig {
    /// Echo headers and bodies and persist each request to `dir`
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Layered load: `config/default`, `config/local`, then `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load a single configuration file in any format the `config` crate reads
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();

        config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to load config file '{}': {}",
                    path.display(),
                    e
                ))
            })
    }

    pub fn from_json_str(content: &str) -> Result<Self, DomainError> {
        serde_json::from_str(content)
            .map_err(|e| DomainError::configuration(format!("Invalid configuration: {}", e)))
    }

    /// Validate the configured profiles into an immutable catalog
    pub fn catalog(&self) -> Result<ProfileCatalog, DomainError> {
        ProfileCatalog::from_configs(self.profiles.clone(), self.default_profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderFamily;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "logging": { "level": "debug", "format": "json" },
        "request_log": { "verbose": true, "dir": "logs" },
        "default_profile": "metaso",
        "profiles": [
            {
                "id": "openai",
                "endpoint": "https://api.openai.com/v1/chat/completions",
                "credential_ref": "OPENAI_API_KEY",
                "model": "gpt-4o-mini",
                "extra_params": { "temperature": "0.7" }
            },
            {
                "id": "metaso",
                "endpoint": "https://metaso.cn/api/open/search",
                "credential_ref": "METASO_API_KEY",
                "question_field": "question",
                "extra_params": { "lang": "en", "enableMix": "false" }
            }
        ]
    }"#;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.request_log.verbose);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_parse_json_config() {
        let config = AppConfig::from_json_str(SAMPLE).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert!(config.request_log.verbose);
        assert_eq!(config.request_log.dir, Some(PathBuf::from("logs")));

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve(None).unwrap().family(), ProviderFamily::Search);

        let metaso = catalog.get_required("metaso").unwrap();
        let keys: Vec<&str> = metaso.extra_params().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lang", "enableMix"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.default_profile.as_deref(), Some("metaso"));

        let metaso = &config.profiles[1];
        assert_eq!(metaso.question_field.as_deref(), Some("question"));
        assert_eq!(metaso.extra_params.get("enableMix"), Some(&serde_json::json!("false")));
        assert_eq!(metaso.extra_params.get("lang"), Some(&serde_json::json!("en")));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = AppConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_profile_fails_catalog() {
        let config = AppConfig::from_json_str(
            r#"{ "profiles": [ { "id": "x", "endpoint": "https://a.example", "credential_ref": "K" } ] }"#,
        )
        .unwrap();

        assert!(config.catalog().unwrap_err().to_string().contains("requires a model"));
    }
}
