// src/agent/executor.rs

use tracing::{debug, warn};

use crate::error::ToolError;
use crate::protocol::{DEFAULT_LIMIT, Plan, Step, StepResult};
use crate::tools::{ToolKind, ToolOutput, ToolSet};

pub const UNKNOWN_TOOL: &str = "Unknown tool";

/// Runs plan steps in order. A failing step becomes an error record and
/// never stops the steps after it.
pub struct TaskExecutor<'a> {
    tools: &'a dyn ToolSet,
}

impl<'a> TaskExecutor<'a> {
    pub fn new(tools: &'a dyn ToolSet) -> Self {
        Self { tools }
    }

    /// One result per step, in step order.
    pub fn execute(&self, plan: &Plan) -> Vec<StepResult> {
        plan.steps.iter().map(|step| self.run_step(step)).collect()
    }

    fn run_step(&self, step: &Step) -> StepResult {
        let Some(kind) = step.kind() else {
            warn!(tool = %step.tool, "unknown tool in plan");
            return StepResult::failure(&step.tool, UNKNOWN_TOOL);
        };

        debug!(tool = %step.tool, "executing step");
        match self.invoke(kind, step) {
            Ok(output) => StepResult::success(&step.tool, output),
            Err(e) => {
                warn!(tool = %step.tool, error = %e, "step failed");
                StepResult::failure(&step.tool, e.to_string())
            }
        }
    }

    fn invoke(&self, kind: ToolKind, step: &Step) -> Result<ToolOutput, ToolError> {
        match kind {
            ToolKind::GithubSearch => {
                let query = step
                    .query
                    .as_deref()
                    .ok_or(ToolError::MissingParameter("query"))?;
                let limit = step.limit.unwrap_or(DEFAULT_LIMIT);
                let limit = u32::try_from(limit).map_err(|_| ToolError::InvalidParameter {
                    name: "limit",
                    reason: format!("{limit} is not a valid result count"),
                })?;
                self.tools
                    .search_repositories(query, limit)
                    .map(ToolOutput::Repositories)
            }
            ToolKind::Weather => {
                let city = step
                    .city
                    .as_deref()
                    .ok_or(ToolError::MissingParameter("city"))?;
                self.tools.get_weather(city).map(ToolOutput::Weather)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::StepOutcome;
    use crate::tools::{CurrentWeather, Repository, WeatherLookup};
    use std::sync::Mutex;

    /// Records every call; fails any tool named in `failing`.
    #[derive(Default)]
    pub(crate) struct RecordingTools {
        pub calls: Mutex<Vec<String>>,
        pub failing: Vec<&'static str>,
    }

    impl RecordingTools {
        pub(crate) fn failing(tools: &[&'static str]) -> Self {
            Self {
                failing: tools.to_vec(),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ToolSet for RecordingTools {
        fn search_repositories(&self, query: &str, limit: u32) -> Result<Vec<Repository>, ToolError> {
            self.calls.lock().unwrap().push(format!("github_search:{query}:{limit}"));
            if self.failing.contains(&"github_search") {
                return Err(ToolError::Decode("rate limited".into()));
            }
            Ok(vec![Repository {
                name: Some(format!("{query}/awesome")),
                stars: Some(42),
                url: None,
            }])
        }

        fn get_weather(&self, city: &str) -> Result<WeatherLookup, ToolError> {
            self.calls.lock().unwrap().push(format!("weather:{city}"));
            if self.failing.contains(&"weather") {
                return Err(ToolError::Decode("geocoder down".into()));
            }
            Ok(WeatherLookup::Current(CurrentWeather {
                temperature: Some(20.0),
                windspeed: Some(5.0),
                time: None,
            }))
        }
    }

    #[test]
    fn one_result_per_step_in_order() {
        let tools = RecordingTools::default();
        let plan = Plan::new(vec![
            Step::github_search("rust", 5),
            Step::weather("Paris"),
            Step::github_search("go", 1),
        ]);

        let results = TaskExecutor::new(&tools).execute(&plan);

        let names: Vec<_> = results.iter().map(|r| r.tool.as_str()).collect();
        assert_eq!(names, ["github_search", "weather", "github_search"]);
        assert!(results.iter().all(StepResult::is_success));
        assert_eq!(
            tools.calls(),
            ["github_search:rust:5", "weather:Paris", "github_search:go:1"]
        );
    }

    #[test]
    fn failure_is_isolated_to_its_step() {
        let tools = RecordingTools::failing(&["weather"]);
        let plan = Plan::new(vec![Step::weather("Paris"), Step::github_search("rust", 3)]);

        let results = TaskExecutor::new(&tools).execute(&plan);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].error(), Some("unexpected response: geocoder down"));
        assert!(results[1].is_success());
    }

    #[test]
    fn unknown_tool_never_touches_the_tool_set() {
        let tools = RecordingTools::default();
        let plan = Plan::new(vec![Step {
            tool: "stock_price".into(),
            query: Some("AAPL".into()),
            limit: None,
            city: None,
        }]);

        let results = TaskExecutor::new(&tools).execute(&plan);

        assert_eq!(results, vec![StepResult::failure("stock_price", UNKNOWN_TOOL)]);
        assert!(tools.calls().is_empty());
    }

    #[test]
    fn limit_defaults_to_three() {
        let tools = RecordingTools::default();
        let plan = Plan::new(vec![Step {
            tool: "github_search".into(),
            query: Some("python".into()),
            limit: None,
            city: None,
        }]);

        TaskExecutor::new(&tools).execute(&plan);

        assert_eq!(tools.calls(), ["github_search:python:3"]);
    }

    #[test]
    fn bad_parameters_fail_without_calling_out() {
        let tools = RecordingTools::default();
        let plan = Plan::new(vec![
            Step {
                tool: "weather".into(),
                query: None,
                limit: None,
                city: None,
            },
            Step::github_search("rust", -1),
        ]);

        let results = TaskExecutor::new(&tools).execute(&plan);

        assert!(matches!(&results[0].outcome, StepOutcome::Failure(e) if e == "missing parameter 'city'"));
        assert!(matches!(&results[1].outcome, StepOutcome::Failure(e) if e.starts_with("invalid parameter 'limit'")));
        assert!(tools.calls().is_empty());
    }

    #[test]
    fn empty_plan_yields_no_results() {
        let tools = RecordingTools::default();
        assert!(TaskExecutor::new(&tools).execute(&Plan::default()).is_empty());
    }
}
