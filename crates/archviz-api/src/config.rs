//! Process configuration, loaded once at startup and injected into components.

use archviz_remote::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use archviz_types::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LISTEN: &str = "0.0.0.0:8001";
const DEFAULT_STATUS_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Root of the artifact cache, served under `/videos`.
    pub output_dir: PathBuf,
    pub listen: SocketAddr,
    pub status_timeout: Duration,
    pub download_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("output_dir", &self.output_dir)
            .field("listen", &self.listen)
            .field("status_timeout", &self.status_timeout)
            .field("download_timeout", &self.download_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Read from process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let base_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = get("VEO_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let output_dir = get("ARCHVIZ_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("archviz_videos"));
        let listen_raw = get("ARCHVIZ_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "ARCHVIZ_LISTEN".to_string(),
                message: e.to_string(),
            })?;
        let status_timeout = secs(
            "ARCHVIZ_STATUS_TIMEOUT_SECS",
            get("ARCHVIZ_STATUS_TIMEOUT_SECS"),
            DEFAULT_STATUS_TIMEOUT_SECS,
        )?;
        let download_timeout = secs(
            "ARCHVIZ_DOWNLOAD_TIMEOUT_SECS",
            get("ARCHVIZ_DOWNLOAD_TIMEOUT_SECS"),
            DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_key,
            base_url,
            model,
            output_dir,
            listen,
            status_timeout,
            download_timeout,
        })
    }
}

fn secs(key: &str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("expected a positive number of seconds, got {:?}", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.listen.port(), 8001);
        assert_eq!(cfg.status_timeout, Duration::from_secs(60));
        assert_eq!(cfg.download_timeout, Duration::from_secs(120));
        assert!(cfg.output_dir.ends_with("archviz_videos"));
    }

    #[test]
    fn overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_BASE_URL", "http://localhost:9000/v1"),
            ("VEO_MODEL", "veo-2.0-generate-001"),
            ("ARCHVIZ_OUTPUT_DIR", "/srv/videos"),
            ("ARCHVIZ_LISTEN", "127.0.0.1:9100"),
            ("ARCHVIZ_STATUS_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.model, "veo-2.0-generate-001");
        assert_eq!(cfg.output_dir, PathBuf::from("/srv/videos"));
        assert_eq!(cfg.listen.to_string(), "127.0.0.1:9100");
        assert_eq!(cfg.status_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("ARCHVIZ_DOWNLOAD_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "ARCHVIZ_DOWNLOAD_TIMEOUT_SECS"));
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("ARCHVIZ_LISTEN", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "secret-key")])).unwrap();
        assert!(!format!("{:?}", cfg).contains("secret-key"));
    }
}
