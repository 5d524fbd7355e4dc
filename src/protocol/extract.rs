// src/protocol/extract.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Greedy: spans from the first `{` to the last `}`.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("static regex"));

/// Outcome of pulling a JSON value out of free-form oracle text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Parsed(Value),
    /// Nothing parseable; carries the raw text unchanged.
    Failed(String),
}

/// Parse `raw` as JSON, falling back to the outermost `{...}` block.
pub fn extract_json(raw: &str) -> Extracted {
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        return Extracted::Parsed(value);
    }

    JSON_BLOCK
        .find(raw)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .map(Extracted::Parsed)
        .unwrap_or_else(|| Extracted::Failed(raw.to_string()))
}
