// src/validation/plan.rs

use serde_json::{Map, Value, json};
use thiserror::Error;

const TOP_LEVEL_FIELDS: &[&str] = &["steps"];
const STEP_FIELDS: &[&str] = &["tool", "query", "limit", "city"];

/// JSON schema every plan must satisfy. Also shown verbatim to the oracle.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "steps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "tool": {"type": "string"},
                        "query": {"type": "string"},
                        "limit": {"type": "integer"},
                        "city": {"type": "string"}
                    },
                    "required": ["tool"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["steps"],
        "additionalProperties": false
    })
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanValidationError {
    #[error("{path}: expected an object")]
    NotAnObject { path: String },
    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: &'static str },
    #[error("{path}: unexpected field '{field}'")]
    UnexpectedField { path: String, field: String },
    #[error("{path}.{field}: expected {expected}")]
    WrongType {
        path: String,
        field: String,
        expected: &'static str,
    },
    #[error("plan does not deserialize: {0}")]
    Malformed(String),
}

impl PlanValidationError {
    /// Short explanation plus an example fragment, for logs.
    pub fn hint(&self) -> (String, Option<Value>) {
        match self {
            PlanValidationError::NotAnObject { .. } => (
                "Plans and steps must be JSON objects.".to_string(),
                Some(json!({ "steps": [{ "tool": "weather", "city": "London" }] })),
            ),
            PlanValidationError::MissingField { field, .. } => (
                "Missing required field.".to_string(),
                Some(json!({ field.to_string(): "<required>" })),
            ),
            PlanValidationError::UnexpectedField { field, .. } => (
                format!("Field '{field}' is not part of the plan schema."),
                Some(json!({ "allowed": STEP_FIELDS })),
            ),
            PlanValidationError::WrongType { field, expected, .. } => (
                format!("Field '{field}' must be {expected}."),
                None,
            ),
            PlanValidationError::Malformed(reason) => (reason.clone(), None),
        }
    }
}

/// Structural check against [`plan_schema`]. Tool names are not checked
/// here; unknown tools fail at execution time.
pub fn validate_plan(plan: &Value) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();

    let Some(root) = plan.as_object() else {
        errors.push(PlanValidationError::NotAnObject {
            path: "$".to_string(),
        });
        return errors;
    };

    reject_extra_fields(root, TOP_LEVEL_FIELDS, "$", &mut errors);

    let Some(steps) = root.get("steps") else {
        errors.push(PlanValidationError::MissingField {
            path: "$".to_string(),
            field: "steps",
        });
        return errors;
    };

    let Some(steps) = steps.as_array() else {
        errors.push(PlanValidationError::WrongType {
            path: "$".to_string(),
            field: "steps".to_string(),
            expected: "an array",
        });
        return errors;
    };

    for (i, step) in steps.iter().enumerate() {
        let path = format!("$.steps[{i}]");
        let Some(step) = step.as_object() else {
            errors.push(PlanValidationError::NotAnObject { path });
            continue;
        };

        reject_extra_fields(step, STEP_FIELDS, &path, &mut errors);

        match step.get("tool") {
            None => errors.push(PlanValidationError::MissingField {
                path: path.clone(),
                field: "tool",
            }),
            Some(tool) if !tool.is_string() => errors.push(wrong_type(&path, "tool", "a string")),
            Some(_) => {}
        }

        for field in ["query", "city"] {
            if step.get(field).is_some_and(|v| !v.is_string()) {
                errors.push(wrong_type(&path, field, "a string"));
            }
        }

        if step.get("limit").is_some_and(|v| !v.is_i64()) {
            errors.push(wrong_type(&path, "limit", "an integer"));
        }
    }

    errors
}

fn reject_extra_fields(
    obj: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
    errors: &mut Vec<PlanValidationError>,
) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(PlanValidationError::UnexpectedField {
                path: path.to_string(),
                field: key.clone(),
            });
        }
    }
}

fn wrong_type(path: &str, field: &str, expected: &'static str) -> PlanValidationError {
    PlanValidationError::WrongType {
        path: path.to_string(),
        field: field.to_string(),
        expected,
    }
}
