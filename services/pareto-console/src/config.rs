//! Configuration for the Pareto console

use pareto_model::Portal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Pareto API, without the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory holding `session.json`
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Which login surface commands act as
    #[serde(default)]
    pub portal: Portal,
    /// How long alerts stay visible
    #[serde(default = "default_alert_duration", with = "humantime_serde")]
    pub alert_duration: Duration,
    /// Per-request timeout; the transport default applies when absent
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            state_dir: default_state_dir(),
            portal: Portal::default(),
            alert_duration: default_alert_duration(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Location of the persisted session store
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE_NAME)
    }

    pub fn alert_ttl_ms(&self) -> u64 {
        u64::try_from(self.alert_duration.as_millis()).unwrap_or(u64::MAX)
    }
}

pub const SESSION_FILE_NAME: &str = "session.json";

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".pareto")
}

fn default_alert_duration() -> Duration {
    Duration::from_millis(pareto_model::ALERT_TTL_MS)
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::ConsoleError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    if config.api_base_url.trim().is_empty() {
        return Err(crate::ConsoleError::Config(
            "api_base_url must not be empty".to_string(),
        ));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "api_base_url": "https://pareto.example.test",
            "state_dir": "/var/lib/pareto",
            "portal": "user",
            "alert_duration": "3s",
            "request_timeout": "30s"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.api_base_url, "https://pareto.example.test");
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/pareto"));
        assert_eq!(config.portal, Portal::User);
        assert_eq!(config.alert_duration, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.session_file(),
            PathBuf::from("/var/lib/pareto/session.json")
        );
    }

    #[test]
    fn parse_minimal_config() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.portal, Portal::Admin);
        assert_eq!(config.alert_duration, Duration::from_secs(5));
        assert_eq!(config.alert_ttl_ms(), 5_000);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/pareto.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"api_base_url": "http://api.local:8080"}"#).unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.api_base_url, "http://api.local:8080");
    }

    #[test]
    fn load_config_rejects_blank_url() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"api_base_url": " "}"#).unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn load_config_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "not json").unwrap();

        assert!(load_config(&config_path).is_err());
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config, serde_json::from_str::<Config>("{}").unwrap());
    }
}
