// src/oracle/mod.rs

//! Oracle Gateway: prompt in, raw completion text out.
//!
//! The gateway never retries and never parses. Callers are responsible for
//! pulling JSON out of whatever text comes back.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::OracleError;

pub mod scripted;

pub use scripted::ScriptedOracle;

pub trait Oracle: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Local model served by Ollama's `/api/generate`.
pub struct OllamaOracle {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl OllamaOracle {
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Oracle for OllamaOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "num_predict": self.max_tokens }
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "sending prompt to oracle");

        let resp = self.client.post(&self.endpoint).json(&payload).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }

        let body: Value = resp.json()?;
        body.get("response")
            .and_then(|v| v.as_str())
            .map(|text| text.trim().to_string())
            .ok_or(OracleError::MissingResponse)
    }
}
