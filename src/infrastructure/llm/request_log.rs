//! Outbound request logging with credential masking

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RequestLogConfig;
use crate::domain::credentials::mask_secret;

const SECRET_HEADERS: [&str; 2] = ["authorization", "secret-key"];

/// Logs every outbound request; echoes and persists it when verbose
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    verbose: bool,
    dir: Option<PathBuf>,
}

impl RequestLogger {
    pub fn new(verbose: bool, dir: Option<PathBuf>) -> Self {
        Self { verbose, dir }
    }

    pub fn from_config(config: &RequestLogConfig) -> Self {
        Self::new(config.verbose, config.dir.clone())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Record one request. Returns the path of the persisted record, if one was written.
    pub async fn record(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
    ) -> Option<PathBuf> {
        info!(method = %method, endpoint = %url, payload = %body, "Outbound request");

        if !self.verbose {
            return None;
        }

        let masked = mask_headers(headers);
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        info!(method = %method, endpoint = %url, headers = ?masked, "Request headers");
        info!("Request body:\n{}", pretty);

        let dir = self.dir.as_deref()?;
        match persist(dir, method, url, &masked, body).await {
            Ok(path) => {
                info!(path = %path.display(), "Request saved");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "Failed to save request log");
                None
            }
        }
    }
}

/// Replace secret header values with their masked form
pub fn mask_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let is_secret = SECRET_HEADERS
                .iter()
                .any(|secret| name.eq_ignore_ascii_case(secret));
            if is_secret {
                (name.clone(), mask_secret(value))
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

async fn persist(
    dir: &Path,
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: &serde_json::Value,
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let now = Utc::now();
    let request_id = Uuid::new_v4().simple().to_string();
    let path = dir.join(format!(
        "request_{}_{}.json",
        now.format("%Y%m%d_%H%M%S"),
        &request_id[..8]
    ));

    let header_map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect();

    let record = json!({
        "timestamp": now.to_rfc3339(),
        "request_id": request_id,
        "method": method,
        "endpoint": url,
        "headers": header_map,
        "payload": body,
    });

    let content = serde_json::to_vec_pretty(&record).map_err(std::io::Error::other)?;
    tokio::fs::write(&path, content).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Shared buffer that a test subscriber writes formatted events into
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn headers() -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), "Bearer sk-secret".to_string()),
            ("secret-key".to_string(), "raw-secret".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    #[test]
    fn test_mask_headers() {
        let masked = mask_headers(&headers());

        assert_eq!(masked[0].1, "Bearer ***");
        assert_eq!(masked[1].1, "***");
        assert_eq!(masked[2].1, "application/json");
    }

    #[tokio::test]
    async fn test_quiet_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::new(false, Some(dir.path().to_path_buf()));

        let saved = logger
            .record("POST", "https://a.example", &headers(), &json!({"q": 1}))
            .await;

        assert!(saved.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_quiet_logger_still_logs_request() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let logger = RequestLogger::new(false, None);
        logger
            .record(
                "POST",
                "https://search.example/api",
                &headers(),
                &json!({"question": "what is rust"}),
            )
            .await;

        let output = logs.contents();
        assert!(output.contains("Outbound request"));
        assert!(output.contains("POST"));
        assert!(output.contains("https://search.example/api"));
        assert!(output.contains("what is rust"));
        assert!(!output.contains("sk-secret"));
        assert!(!output.contains("raw-secret"));
        assert!(!output.contains("Request headers"));
    }

    #[tokio::test]
    async fn test_verbose_logger_persists_masked_record() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::new(true, Some(dir.path().join("requests")));

        let path = logger
            .record("POST", "https://a.example/x", &headers(), &json!({"question": "hi"}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("sk-secret"));
        assert!(!content.contains("raw-secret"));

        let record: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(record["endpoint"], "https://a.example/x");
        assert_eq!(record["headers"]["Authorization"], "Bearer ***");
        assert_eq!(record["payload"]["question"], "hi");
    }

    #[tokio::test]
    async fn test_verbose_without_dir_only_echoes() {
        let logger = RequestLogger::new(true, None);
        let saved = logger
            .record("POST", "https://a.example", &headers(), &json!({}))
            .await;
        assert!(saved.is_none());
    }
}
