// src/validation/plausibility.rs

//! Reject oracle plans that are well-formed but obviously not about the task.

use thiserror::Error;

use crate::protocol::{Plan, Step};
use crate::tools::ToolKind;
use crate::validation::intent::{IntentDetector, TaskIntent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Implausibility {
    #[error("plan uses {0} which the task does not ask for")]
    UnrequestedTool(&'static str),
    #[error("task names {expected} but plan uses {found:?}")]
    WrongCity { expected: String, found: String },
    #[error("task names {expected} but plan searches {found:?}")]
    WrongLanguage { expected: String, found: String },
    #[error("plan fell back to the generic value {0:?}")]
    GenericDefault(String),
}

pub fn check_plausibility(
    task: &str,
    plan: &Plan,
    detector: &IntentDetector,
) -> Result<(), Implausibility> {
    let intent = detector.detect(task);
    let vocabulary = detector.vocabulary();

    check_tool_choice(&intent, plan)?;

    if let Some(city) = &intent.city {
        check_parameter(
            plan,
            ToolKind::Weather,
            intent.wants_weather,
            city,
            &vocabulary.generic_city,
            |s| s.city.as_deref(),
        )
        .map_err(|found| match found {
            Mismatch::Wrong(found) => Implausibility::WrongCity {
                expected: city.clone(),
                found,
            },
            Mismatch::Generic(found) => Implausibility::GenericDefault(found),
        })?;
    }

    if let Some(language) = &intent.language {
        check_parameter(
            plan,
            ToolKind::GithubSearch,
            intent.wants_github,
            language,
            &vocabulary.generic_language,
            |s| s.query.as_deref(),
        )
        .map_err(|found| match found {
            Mismatch::Wrong(found) => Implausibility::WrongLanguage {
                expected: language.clone(),
                found,
            },
            Mismatch::Generic(found) => Implausibility::GenericDefault(found),
        })?;
    }

    Ok(())
}

/// Keywords match as substrings ("repo" in "report"), so a task can look
/// like it asks for more tools than it does. A plan is only rejected when
/// none of its tools is one the task asks for.
fn check_tool_choice(intent: &TaskIntent, plan: &Plan) -> Result<(), Implausibility> {
    if !intent.is_recognized() {
        return Ok(());
    }

    let used: Vec<ToolKind> = ToolKind::ALL.into_iter().filter(|&k| plan.uses(k)).collect();
    match used.first() {
        Some(first) if !used.iter().any(|&k| intent.wants(k)) => {
            Err(Implausibility::UnrequestedTool(first.name()))
        }
        _ => Ok(()),
    }
}

enum Mismatch {
    Wrong(String),
    Generic(String),
}

fn check_parameter(
    plan: &Plan,
    kind: ToolKind,
    requested: bool,
    expected: &str,
    generic: &str,
    field: impl Fn(&Step) -> Option<&str>,
) -> Result<(), Mismatch> {
    for step in plan.steps_for(kind) {
        let value = field(step).unwrap_or_default();

        if requested && !value.eq_ignore_ascii_case(expected) {
            return Err(Mismatch::Wrong(value.to_string()));
        }

        if !expected.eq_ignore_ascii_case(generic) && value.eq_ignore_ascii_case(generic) {
            return Err(Mismatch::Generic(value.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::intent::Vocabulary;

    fn check(task: &str, steps: Vec<Step>) -> Result<(), Implausibility> {
        check_plausibility(task, &Plan::new(steps), &IntentDetector::default())
    }

    #[test]
    fn matching_plan_is_plausible() {
        assert_eq!(check("Get weather in London", vec![Step::weather("London")]), Ok(()));
        assert_eq!(
            check(
                "Find python repositories and weather in London",
                vec![Step::github_search("python", 3), Step::weather("london")]
            ),
            Ok(())
        );
    }

    #[test]
    fn wrong_city_is_rejected() {
        assert_eq!(
            check("Weather in Berlin please", vec![Step::weather("Paris")]),
            Err(Implausibility::WrongCity {
                expected: "Berlin".into(),
                found: "Paris".into()
            })
        );
    }

    #[test]
    fn wrong_language_is_rejected() {
        assert!(matches!(
            check("Find rust repositories", vec![Step::github_search("python", 3)]),
            Err(Implausibility::WrongLanguage { .. })
        ));
    }

    #[test]
    fn tool_choice_must_follow_intent() {
        assert_eq!(
            check("Get weather in London", vec![Step::github_search("python", 3)]),
            Err(Implausibility::UnrequestedTool("github_search"))
        );
        assert_eq!(
            check(
                "Get weather in London",
                vec![Step::weather("London"), Step::github_search("python", 3)]
            ),
            Ok(())
        );
    }

    #[test]
    fn keyword_inside_another_word_does_not_demand_a_tool() {
        // "report" contains "repo", "research" contains "search"
        assert_eq!(
            check("Give me the weather report for Paris", vec![Step::weather("Paris")]),
            Ok(())
        );
        assert_eq!(
            check("Weather for my research trip to Tokyo", vec![Step::weather("Tokyo")]),
            Ok(())
        );
    }

    #[test]
    fn partial_plan_for_a_two_part_task_is_accepted() {
        assert_eq!(
            check(
                "Find python repositories and weather in London",
                vec![Step::weather("London")]
            ),
            Ok(())
        );
    }

    #[test]
    fn generic_default_is_rejected_even_without_keywords() {
        assert_eq!(
            check("Paris, what is it like there", vec![Step::weather("Delhi")]),
            Err(Implausibility::GenericDefault("Delhi".into()))
        );
        assert_eq!(check("Delhi, what is it like there", vec![Step::weather("Delhi")]), Ok(()));
    }

    #[test]
    fn generic_defaults_are_configurable() {
        let vocabulary = Vocabulary {
            generic_city: "Oslo".into(),
            ..Vocabulary::default()
        };
        let detector = IntentDetector::new(vocabulary);
        let plan = Plan::new(vec![Step::weather("Delhi")]);
        assert_eq!(check_plausibility("Paris, what is it like", &plan, &detector), Ok(()));
    }

    #[test]
    fn unrecognized_task_accepts_any_plan() {
        assert_eq!(check("Tell me a joke", vec![Step::weather("London")]), Ok(()));
    }
}
