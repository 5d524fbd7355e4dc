// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the reasoning oracle.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("oracle returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("oracle response missing 'response' field")]
    MissingResponse,

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Failures raised by a Tool Set operation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("missing parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        operation: &'static str,
        attempts: u32,
        last: Box<ToolError>,
    },
}

/// The only fatal condition of an orchestration run: the oracle never
/// produced parseable JSON.
#[derive(Error, Debug)]
pub enum PlanGenerationError {
    #[error("planner failed to produce a JSON plan after {attempts} attempts. Last output:\n{last_output}")]
    Exhausted { attempts: u32, last_output: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}
