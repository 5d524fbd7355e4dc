pub mod intent;
pub mod plan;
pub mod plausibility;

pub use intent::{IntentDetector, TaskIntent, Vocabulary};
pub use plan::{PlanValidationError, plan_schema, validate_plan};
pub use plausibility::{Implausibility, check_plausibility};
