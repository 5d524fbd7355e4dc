// src/protocol/planner.rs

//! Plan Generator: task text in, validated [`Plan`] out.
//!
//! Each attempt asks the oracle for a plan, then classifies the reply as
//! unparseable, schema-invalid or parsed. Parsed plans must also pass the
//! plausibility check against the task. When attempts run out the generator
//! falls back to a rule-based plan, except when the oracle never produced
//! JSON at all on the last attempt, which is an error.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::PlanGenerationError;
use crate::oracle::Oracle;
use crate::protocol::extract::{Extracted, extract_json};
use crate::protocol::{DEFAULT_LIMIT, Plan, Step};
use crate::tools::{Sleeper, ToolKind, thread_sleeper};
use crate::validation::{
    IntentDetector, PlanValidationError, Vocabulary, check_plausibility, plan_schema, validate_plan,
};

/// Classification of one oracle reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanCandidate {
    Parsed(Plan),
    SchemaInvalid(Vec<PlanValidationError>),
    Unparseable(String),
}

impl PlanCandidate {
    pub fn from_oracle_output(raw: &str) -> Self {
        let value = match extract_json(raw) {
            Extracted::Parsed(value) => value,
            Extracted::Failed(raw) => return PlanCandidate::Unparseable(raw),
        };

        let errors = validate_plan(&value);
        if !errors.is_empty() {
            return PlanCandidate::SchemaInvalid(errors);
        }

        match serde_json::from_value::<Plan>(value) {
            Ok(plan) => PlanCandidate::Parsed(plan),
            Err(e) => PlanCandidate::SchemaInvalid(vec![PlanValidationError::Malformed(e.to_string())]),
        }
    }
}

pub struct PlanGenerator<'a> {
    oracle: &'a dyn Oracle,
    intent: IntentDetector,
    max_retries: u32,
    retry_delay: Duration,
    sleeper: Sleeper,
}

impl<'a> PlanGenerator<'a> {
    pub fn new(oracle: &'a dyn Oracle) -> Self {
        Self {
            oracle,
            intent: IntentDetector::default(),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            sleeper: thread_sleeper(),
        }
    }

    pub fn from_config(oracle: &'a dyn Oracle, config: &Config) -> Self {
        Self::new(oracle)
            .with_vocabulary(config.vocabulary.clone())
            .with_retries(config.planner.max_retries, config.planner.retry_delay())
    }

    /// `max_retries` of zero still makes one attempt.
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.intent = IntentDetector::new(vocabulary);
        self
    }

    /// Replaces the wait between attempts (`retry_delay * attempt`).
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn create_plan(&self, task: &str) -> Result<Plan, PlanGenerationError> {
        let prompt = build_prompt(task);
        let attempts = self.max_retries.max(1);
        let mut attempt = 1;

        loop {
            let raw = match self.oracle.complete(&prompt) {
                Ok(text) => text,
                Err(e) => {
                    warn!(attempt, error = %e, "oracle call failed");
                    String::new()
                }
            };
            debug!(attempt, raw = %raw, "planner oracle output");

            let last_attempt = attempt >= attempts;

            match PlanCandidate::from_oracle_output(&raw) {
                PlanCandidate::Unparseable(raw) => {
                    warn!(attempt, "no JSON in planner output");
                    if last_attempt {
                        return Err(PlanGenerationError::Exhausted {
                            attempts,
                            last_output: raw,
                        });
                    }
                }
                PlanCandidate::SchemaInvalid(errors) => {
                    for error in &errors {
                        let (hint, _) = error.hint();
                        warn!(attempt, %error, hint = %hint, "plan failed schema validation");
                    }
                    if last_attempt {
                        return Ok(self.fallback(task));
                    }
                }
                PlanCandidate::Parsed(plan) => match check_plausibility(task, &plan, &self.intent) {
                    Ok(()) => {
                        info!(attempt, steps = plan.steps.len(), "accepted oracle plan");
                        return Ok(plan);
                    }
                    Err(reason) => {
                        warn!(attempt, %reason, "oracle plan does not fit the task");
                        if last_attempt {
                            return Ok(self.fallback(task));
                        }
                    }
                },
            }

            (self.sleeper)(self.retry_delay * attempt);
            attempt += 1;
        }
    }

    /// Deterministic keyword plan. Never fails; may be empty.
    pub fn fallback_plan(&self, task: &str) -> Plan {
        let intent = self.intent.detect(task);
        let vocabulary = self.intent.vocabulary();
        let mut steps = Vec::new();

        if intent.wants_weather {
            let city = intent.city.as_deref().unwrap_or(&vocabulary.default_city);
            steps.push(Step::weather(city));
        }

        if intent.wants_github {
            let query = intent
                .language
                .as_deref()
                .unwrap_or(&vocabulary.default_language);
            steps.push(Step::github_search(query, DEFAULT_LIMIT));
        }

        Plan::new(steps)
    }

    fn fallback(&self, task: &str) -> Plan {
        let plan = self.fallback_plan(task);
        warn!(steps = plan.steps.len(), "oracle attempts exhausted, using rule-based plan");
        plan
    }
}

pub fn build_prompt(task: &str) -> String {
    let tools = ToolKind::ALL
        .iter()
        .map(|kind| format!("- {}", kind.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let schema = serde_json::to_string_pretty(&plan_schema()).unwrap_or_default();

    format!(
        r#"You are a planning agent. Your job is to analyze the user's task and create a step-by-step plan using the available tools.

AVAILABLE TOOLS:
{tools}

RESPONSE FORMAT:
You must respond with ONLY a JSON object. No explanations, no extra text, just JSON.

JSON Schema:
{schema}

EXAMPLES:
Task: "Find python repositories and weather in London"
Response: {{"steps": [{{"tool": "github_search", "query": "python", "limit": 3}}, {{"tool": "weather", "city": "London"}}]}}

Task: "Get weather in New York"
Response: {{"steps": [{{"tool": "weather", "city": "New York"}}]}}

Task: "Search for javascript repositories"
Response: {{"steps": [{{"tool": "github_search", "query": "javascript", "limit": 3}}]}}

INSTRUCTIONS:
1. Read the task carefully
2. Identify which tools are needed
3. Extract specific parameters (city names, search queries)
4. Generate the appropriate JSON response
5. Do NOT add any tools that aren't mentioned in the task
6. Use the exact tool names: "github_search" and "weather"

TASK TO PROCESS:
{task}

JSON RESPONSE:"#
    )
}
