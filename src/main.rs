use std::path::PathBuf;
use std::process::ExitCode;

use agentic_orchestrator::protocol::planner::PlanGenerator;
use agentic_orchestrator::validation::plan_schema;
use agentic_orchestrator::{Config, HttpToolSet, OllamaOracle, Orchestrator, RunReport};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Turn a task description into tool calls, run them, and check the results.
#[derive(Parser)]
#[command(name = "agentic-orchestrator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.agentic-orchestrator/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Oracle model name
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Planner attempts before falling back
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan, execute and verify a task
    Run(TaskInput),
    /// Only generate the plan
    Plan(TaskInput),
    /// Print the plan JSON schema
    Schema,
}

/// The task, given either positionally or as `--task`.
#[derive(Args, Debug, PartialEq)]
struct TaskInput {
    /// Task description, e.g. "Find rust repositories"
    #[arg(required_unless_present = "task_flag")]
    task: Option<String>,

    #[arg(long = "task", id = "task_flag", value_name = "TASK", conflicts_with = "task")]
    task_flag: Option<String>,
}

impl TaskInput {
    fn into_task(self) -> String {
        self.task.or(self.task_flag).unwrap_or_default()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env_overrides();

    if let Some(model) = cli.model {
        config.oracle.model = model;
    }
    if let Some(max_retries) = cli.max_retries {
        config.planner.max_retries = max_retries;
    }

    match cli.command {
        Commands::Schema => print_json(&plan_schema()),
        Commands::Plan(input) => {
            let task = input.into_task();
            let oracle = OllamaOracle::from_config(&config.oracle)?;
            let plan = PlanGenerator::from_config(&oracle, &config).create_plan(&task)?;
            print_json(&plan)
        }
        Commands::Run(input) => {
            let task = input.into_task();
            let oracle = OllamaOracle::from_config(&config.oracle)?;
            let tools = HttpToolSet::from_config(&config.tools)?;
            eprintln!("{} {} ({})", "◆".cyan(), task.bold(), oracle.model().dimmed());

            let report = Orchestrator::new(&oracle, &tools, &config).run(&task)?;
            print_summary(&report);
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(report: &RunReport) {
    for result in &report.results {
        match result.error() {
            None => eprintln!("  {} {}", "✔".green(), result.tool),
            Some(err) => eprintln!("  {} {}: {}", "✘".red(), result.tool, err),
        }
    }

    let status = match report.status.as_str() {
        "ok" => report.status.green(),
        "partial" => report.status.yellow(),
        _ => report.status.red(),
    };
    eprintln!("{} status: {}", "◆".cyan(), status.bold());
    if let Some(analysis) = &report.analysis {
        if !analysis.notes.is_empty() {
            eprintln!("  {}", analysis.notes.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_of(args: &[&str]) -> Result<String, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Run(input) | Commands::Plan(input) => Ok(input.into_task()),
            Commands::Schema => panic!("expected a task command"),
        }
    }

    #[test]
    fn task_is_positional_or_flag() {
        assert_eq!(task_of(&["ao", "run", "Get weather in London"]).unwrap(), "Get weather in London");
        assert_eq!(task_of(&["ao", "run", "--task", "Get weather in London"]).unwrap(), "Get weather in London");
        assert_eq!(task_of(&["ao", "plan", "--task=Find rust repositories"]).unwrap(), "Find rust repositories");
        assert_eq!(task_of(&["ao", "-v", "plan", "Find rust repositories"]).unwrap(), "Find rust repositories");
    }

    #[test]
    fn task_is_required_once() {
        assert!(task_of(&["ao", "run"]).is_err());
        assert!(task_of(&["ao", "plan", "a", "--task", "b"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
