pub mod agent;
pub mod config;
pub mod error;
pub mod oracle;
pub mod protocol;
pub mod tools;
pub mod validation;

pub use agent::{Orchestrator, RunReport, TaskExecutor};
pub use config::Config;
pub use error::{ConfigError, OracleError, PlanGenerationError, ToolError};
pub use oracle::{OllamaOracle, Oracle};
pub use protocol::planner::PlanGenerator;
pub use protocol::verifier::ResultVerifier;
pub use protocol::{Analysis, Plan, Status, Step, StepOutcome, StepResult};
pub use tools::{HttpToolSet, ToolSet};
