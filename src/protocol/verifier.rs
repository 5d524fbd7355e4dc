// src/protocol/verifier.rs

//! Result Verifier: asks the oracle whether the results cover the plan and
//! runs at most one repair round for tools it reports missing.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::agent::TaskExecutor;
use crate::oracle::Oracle;
use crate::protocol::extract::{Extracted, extract_json};
use crate::protocol::{Analysis, Plan, Step, StepResult};

const FIRST_PASS_PARSE_FAILURE: &str = "Verifier failed to return valid JSON";
const SECOND_PASS_PARSE_FAILURE: &str = "Verifier failed to return valid JSON on second pass";

pub struct ResultVerifier<'a> {
    oracle: &'a dyn Oracle,
    executor: &'a TaskExecutor<'a>,
}

impl<'a> ResultVerifier<'a> {
    pub fn new(oracle: &'a dyn Oracle, executor: &'a TaskExecutor<'a>) -> Self {
        Self { oracle, executor }
    }

    /// Never fails. Repaired results are appended to `results`.
    pub fn verify(&self, plan: &Plan, results: &mut Vec<StepResult>) -> Analysis {
        let analysis = self.assess(&analysis_prompt(plan, results), FIRST_PASS_PARSE_FAILURE);
        debug!(status = analysis.status.as_str(), missing = ?analysis.missing_tools, "first assessment");

        let missing = actually_missing(&analysis.missing_tools, results);
        if missing.is_empty() {
            return analysis;
        }

        let repair = Plan::new(
            plan.steps
                .iter()
                .filter(|step| missing.contains(step.tool.as_str()))
                .cloned()
                .collect::<Vec<Step>>(),
        );
        if repair.steps.is_empty() {
            warn!(missing = ?missing, "oracle reported tools that are not in the plan");
            return analysis;
        }

        info!(steps = repair.steps.len(), tools = ?missing, "running repair round");
        let repaired = self.executor.execute(&repair);
        results.extend(repaired);

        self.assess(&repair_prompt(plan, results), SECOND_PASS_PARSE_FAILURE)
    }

    fn assess(&self, prompt: &str, parse_failure: &str) -> Analysis {
        let raw = match self.oracle.complete(prompt) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "verifier could not reach the oracle");
                return Analysis::degraded(format!("Verifier could not reach the oracle: {e}"));
            }
        };

        let parsed = match extract_json(&raw) {
            Extracted::Parsed(value) => Analysis::from_value(&value),
            Extracted::Failed(_) => None,
        };

        parsed.unwrap_or_else(|| {
            warn!(raw = %raw, "unparseable verifier output");
            Analysis::degraded(parse_failure)
        })
    }
}

/// Reported tools minus those that already have a successful result.
pub fn actually_missing<'s>(reported: &'s BTreeSet<String>, results: &[StepResult]) -> BTreeSet<&'s str> {
    let succeeded: BTreeSet<&str> = results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| r.tool.as_str())
        .collect();

    reported
        .iter()
        .map(String::as_str)
        .filter(|tool| !succeeded.contains(tool))
        .collect()
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn analysis_prompt(plan: &Plan, results: &[StepResult]) -> String {
    format!(
        r#"
You are a verifier agent. Given the plan:
{plan}
and the current results:
{results}

Return ONLY a JSON object with keys:
- status: "ok" or "partial"
- missing_tools: array of tool names that are missing
- notes: short human-readable explanation
"#,
        plan = pretty(plan),
        results = pretty(results),
    )
}

fn repair_prompt(plan: &Plan, results: &[StepResult]) -> String {
    format!(
        r#"
After re-running missing steps, the plan is:
{plan}
Results are now:
{results}

Return a final JSON with keys: status, missing_tools (should be empty if repaired), notes.
"#,
        plan = pretty(plan),
        results = pretty(results),
    )
}
