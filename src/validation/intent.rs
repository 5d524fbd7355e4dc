// src/validation/intent.rs

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::tools::ToolKind;

/// Keyword sets, gazetteer and defaults used to read intent out of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub weather_keywords: Vec<String>,
    pub github_keywords: Vec<String>,
    /// Checked in order; put multi-word names before their suffixes.
    pub cities: Vec<String>,
    pub languages: Vec<String>,
    pub default_city: String,
    pub default_language: String,
    /// Values the oracle tends to parrot back from the prompt examples.
    pub generic_city: String,
    pub generic_language: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            weather_keywords: words(&["weather", "temperature", "climate", "forecast"]),
            github_keywords: words(&["github", "repository", "repo", "search", "code", "programming"]),
            cities: words(&[
                "london", "new york", "tokyo", "mumbai", "berlin", "paris", "delhi", "prayagraj",
                "york",
            ]),
            languages: words(&["python", "javascript", "rust", "react", "go", "java", "typescript"]),
            default_city: "London".to_string(),
            default_language: "python".to_string(),
            generic_city: "Delhi".to_string(),
            generic_language: "python".to_string(),
        }
    }
}

/// What a task appears to ask for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskIntent {
    pub wants_weather: bool,
    pub wants_github: bool,
    /// Title case, e.g. "New York".
    pub city: Option<String>,
    /// Lower case, e.g. "rust".
    pub language: Option<String>,
}

impl TaskIntent {
    pub fn wants(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::GithubSearch => self.wants_github,
            ToolKind::Weather => self.wants_weather,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.wants_weather || self.wants_github
    }
}

/// A [`Vocabulary`] with its city and language patterns compiled once.
#[derive(Debug, Clone)]
pub struct IntentDetector {
    vocabulary: Vocabulary,
    cities: NameSet,
    languages: NameSet,
}

impl IntentDetector {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            cities: NameSet::new(&vocabulary.cities),
            languages: NameSet::new(&vocabulary.languages),
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Keywords match anywhere ("repo" hits "repositories"); city and
    /// language names must be whole words so "go" does not hit "good".
    pub fn detect(&self, task: &str) -> TaskIntent {
        let task = task.to_lowercase();
        let mentions = |keywords: &[String]| {
            keywords
                .iter()
                .any(|k| !k.is_empty() && task.contains(&k.to_lowercase()))
        };

        TaskIntent {
            wants_weather: mentions(&self.vocabulary.weather_keywords),
            wants_github: mentions(&self.vocabulary.github_keywords),
            city: self.cities.first_match(&task).map(title_case),
            language: self.languages.first_match(&task).map(str::to_string),
        }
    }
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

/// Whole-word patterns; the earliest listed name wins.
#[derive(Debug, Clone)]
struct NameSet {
    names: Vec<String>,
    patterns: RegexSet,
}

impl NameSet {
    fn new(names: &[String]) -> Self {
        let names: Vec<String> = names
            .iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        let patterns = RegexSet::new(names.iter().map(|name| format!(r"\b{}\b", regex::escape(name))))
            .unwrap_or_else(|_| RegexSet::empty());
        Self { names, patterns }
    }

    fn first_match(&self, task: &str) -> Option<&str> {
        self.patterns
            .matches(task)
            .iter()
            .next()
            .map(|i| self.names[i].as_str())
    }
}

/// "new york" -> "New York"
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
