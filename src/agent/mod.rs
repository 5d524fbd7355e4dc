// src/agent/mod.rs

//! Run entrypoint: plan, execute, verify.

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::PlanGenerationError;
use crate::oracle::Oracle;
use crate::protocol::planner::PlanGenerator;
use crate::protocol::verifier::ResultVerifier;
use crate::protocol::{Analysis, Plan, StepResult};
use crate::tools::ToolSet;

pub mod executor;

pub use executor::{TaskExecutor, UNKNOWN_TOOL};

/// Everything a caller gets back from one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: String,
    pub plan: Plan,
    pub results: Vec<StepResult>,
    pub status: String,
    #[serde(skip)]
    pub analysis: Option<Analysis>,
}

impl RunReport {
    pub fn new(task: &str, plan: Plan, results: Vec<StepResult>, analysis: Option<Analysis>) -> Self {
        let status = analysis
            .as_ref()
            .map(|a| a.status.as_str())
            .unwrap_or("unknown")
            .to_string();

        Self {
            task: task.to_string(),
            plan,
            results,
            status,
            analysis,
        }
    }
}

/// Holds the injected oracle and tool set for the lifetime of the process.
pub struct Orchestrator<'a> {
    oracle: &'a dyn Oracle,
    planner: PlanGenerator<'a>,
    executor: TaskExecutor<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(oracle: &'a dyn Oracle, tools: &'a dyn ToolSet, config: &Config) -> Self {
        Self {
            oracle,
            planner: PlanGenerator::from_config(oracle, config),
            executor: TaskExecutor::new(tools),
        }
    }

    pub fn with_planner(mut self, planner: PlanGenerator<'a>) -> Self {
        self.planner = planner;
        self
    }

    pub fn plan(&self, task: &str) -> Result<Plan, PlanGenerationError> {
        self.planner.create_plan(task)
    }

    /// Fails only when the planner never got JSON out of the oracle.
    pub fn run(&self, task: &str) -> Result<RunReport, PlanGenerationError> {
        let plan = self.plan(task)?;
        info!(steps = plan.steps.len(), "plan ready");

        let mut results = self.executor.execute(&plan);
        let analysis = ResultVerifier::new(self.oracle, &self.executor).verify(&plan, &mut results);
        info!(status = analysis.status.as_str(), results = results.len(), "run finished");

        Ok(RunReport::new(task, plan, results, Some(analysis)))
    }
}
