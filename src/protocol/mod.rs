// src/protocol/mod.rs

//! Values exchanged between the planner, the executor and the verifier.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{ToolKind, ToolOutput};

pub mod extract;
pub mod planner;
pub mod verifier;

pub const DEFAULT_LIMIT: i64 = 3;

/// One planned tool invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Step {
    pub fn github_search(query: &str, limit: i64) -> Self {
        Self {
            tool: ToolKind::GithubSearch.name().to_string(),
            query: Some(query.to_string()),
            limit: Some(limit),
            city: None,
        }
    }

    pub fn weather(city: &str) -> Self {
        Self {
            tool: ToolKind::Weather.name().to_string(),
            query: None,
            limit: None,
            city: Some(city.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ToolKind> {
        ToolKind::from_name(&self.tool)
    }
}

/// Ordered tool invocations. Never mutated once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn uses(&self, kind: ToolKind) -> bool {
        self.steps.iter().any(|s| s.kind() == Some(kind))
    }

    pub fn steps_for(&self, kind: ToolKind) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.kind() == Some(kind))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum StepOutcome {
    #[serde(rename = "result")]
    Success(ToolOutput),
    #[serde(rename = "error")]
    Failure(String),
}

/// Outcome of one step, serialized as `{tool, result}` or `{tool, error}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepResult {
    pub tool: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepResult {
    pub fn success(tool: &str, output: ToolOutput) -> Self {
        Self {
            tool: tool.to_string(),
            outcome: StepOutcome::Success(output),
        }
    }

    pub fn failure(tool: &str, error: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            outcome: StepOutcome::Failure(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Failure(msg) => Some(msg),
            StepOutcome::Success(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Partial,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Partial => "partial",
        }
    }
}

/// The verifier's judgment of how complete a run's results are.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub status: Status,
    pub missing_tools: BTreeSet<String>,
    pub notes: String,
}

impl Analysis {
    /// Conservative verdict used whenever the oracle cannot be trusted.
    pub fn degraded(notes: impl Into<String>) -> Self {
        Self {
            status: Status::Partial,
            missing_tools: BTreeSet::new(),
            notes: notes.into(),
        }
    }

    /// Read an oracle verdict leniently. Returns `None` unless `value` is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let status = match obj.get("status").and_then(Value::as_str) {
            Some(s) if s.trim().eq_ignore_ascii_case("ok") => Status::Ok,
            _ => Status::Partial,
        };

        let missing_tools = obj
            .get("missing_tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let notes = obj
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            status,
            missing_tools,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Repository, WeatherLookup};
    use serde_json::json;

    #[test]
    fn step_serializes_only_present_fields() {
        assert_eq!(
            serde_json::to_value(Step::weather("London")).unwrap(),
            json!({"tool": "weather", "city": "London"})
        );
        assert_eq!(
            serde_json::to_value(Step::github_search("rust", 3)).unwrap(),
            json!({"tool": "github_search", "query": "rust", "limit": 3})
        );
    }

    #[test]
    fn step_result_carries_exactly_one_of_result_or_error() {
        let ok = StepResult::success(
            "github_search",
            ToolOutput::Repositories(vec![Repository {
                name: Some("rust-lang/rust".into()),
                stars: Some(100),
                url: Some("https://github.com/rust-lang/rust".into()),
            }]),
        );
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({
                "tool": "github_search",
                "result": [{"name": "rust-lang/rust", "stars": 100, "url": "https://github.com/rust-lang/rust"}]
            })
        );

        let failed = StepResult::failure("weather", "timeout");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"tool": "weather", "error": "timeout"})
        );
        assert_eq!(failed.error(), Some("timeout"));
    }

    #[test]
    fn city_not_found_is_still_a_result() {
        let r = StepResult::success("weather", ToolOutput::Weather(WeatherLookup::not_found()));
        assert!(r.is_success());
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"tool": "weather", "result": {"error": "City not found"}})
        );
    }

    #[test]
    fn analysis_reads_oracle_verdict_leniently() {
        let a = Analysis::from_value(&json!({
            "status": "OK",
            "missing_tools": ["weather", 7, "weather"],
            "notes": "fine"
        }))
        .unwrap();
        assert_eq!(a.status, Status::Ok);
        assert_eq!(a.missing_tools.len(), 1);
        assert!(a.missing_tools.contains("weather"));

        let b = Analysis::from_value(&json!({"status": "complete"})).unwrap();
        assert_eq!(b.status, Status::Partial);
        assert!(b.missing_tools.is_empty());
        assert_eq!(b.notes, "");

        assert!(Analysis::from_value(&json!(["ok"])).is_none());
    }
}
