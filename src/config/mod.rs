// src/config/mod.rs

//! Layered configuration: serde defaults, then an optional JSON file, then
//! environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::validation::intent::Vocabulary;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Oracle Gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_oracle_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_oracle_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl PlannerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// HTTP tool client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,
    #[serde(default = "default_geocoding_api_base")]
    pub geocoding_api_base: String,
    #[serde(default = "default_forecast_api_base")]
    pub forecast_api_base: String,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_tool_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            github_api_base: default_github_api_base(),
            geocoding_api_base: default_geocoding_api_base(),
            forecast_api_base: default_forecast_api_base(),
            timeout_secs: default_tool_timeout(),
            retries: default_tool_retries(),
            backoff_ms: default_backoff_ms(),
            github_token: None,
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_geocoding_api_base() -> String {
    "https://geocoding-api.open-meteo.com".to_string()
}

fn default_forecast_api_base() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_tool_timeout() -> u64 {
    10
}

fn default_tool_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

impl Config {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                info!("no config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!("loading config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ORACLE_ENDPOINT`, `ORACLE_MODEL` and `GITHUB_TOKEN` as resolved by `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = non_empty("ORACLE_ENDPOINT") {
            self.oracle.endpoint = endpoint;
        }
        if let Some(model) = non_empty("ORACLE_MODEL") {
            self.oracle.model = model;
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.tools.github_token = Some(token);
        }
        self
    }
}

/// `~/.agentic-orchestrator/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".agentic-orchestrator").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.oracle.model, "llama3");
        assert_eq!(config.oracle.max_tokens, 512);
        assert_eq!(config.planner.max_retries, 3);
        assert_eq!(config.planner.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.tools.timeout_secs, 10);
        assert_eq!(config.tools.retries, 3);
        assert!(config.tools.github_token.is_none());
        assert_eq!(config.vocabulary.default_city, "London");
        assert_eq!(config.vocabulary.generic_city, "Delhi");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"planner": {"max_retries": 5}, "oracle": {"model": "mistral"}}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.planner.max_retries, 5);
        assert_eq!(config.planner.retry_delay_ms, 1000);
        assert_eq!(config.oracle.model, "mistral");
        assert_eq!(config.oracle.endpoint, "http://localhost:11434/api/generate");
        assert!(config.vocabulary.cities.iter().any(|c| c == "tokyo"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn overrides_replace_non_empty_values_only() {
        let env: HashMap<&str, &str> = [
            ("ORACLE_MODEL", "phi3"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("ORACLE_ENDPOINT", "  "),
        ]
        .into_iter()
        .collect();

        let config =
            Config::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.oracle.model, "phi3");
        assert_eq!(config.tools.github_token.as_deref(), Some("ghp_test"));
        assert_eq!(config.oracle.endpoint, "http://localhost:11434/api/generate");
    }
}
