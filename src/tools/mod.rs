// src/tools/mod.rs

//! The fixed Tool Set: repository search and weather lookup.

use serde::{Deserialize, Serialize};

use crate::config::ToolsConfig;
use crate::error::ToolError;

pub mod github;
pub mod retry;
pub mod weather;

pub use github::GithubClient;
pub use retry::{RetryPolicy, Sleeper, thread_sleeper};
pub use weather::WeatherClient;

/// Tool identifiers the executor knows how to dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GithubSearch,
    Weather,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::GithubSearch, ToolKind::Weather];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::GithubSearch => "github_search",
            ToolKind::Weather => "weather",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Signature and usage line shown to the oracle.
    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::GithubSearch => {
                "github_search(query, limit) - Search GitHub repositories. Use 'query' for search terms, 'limit' for number of results (default 3)."
            }
            ToolKind::Weather => "weather(city) - Get current weather information for a city.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Repository {
    pub name: Option<String>,
    pub stars: Option<u64>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub time: Option<String>,
}

/// Weather payload. An unknown city is a successful lookup, not a failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherLookup {
    Current(CurrentWeather),
    NotFound { error: String },
}

impl WeatherLookup {
    pub fn not_found() -> Self {
        WeatherLookup::NotFound {
            error: "City not found".to_string(),
        }
    }
}

/// Success payload of any tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Repositories(Vec<Repository>),
    Weather(WeatherLookup),
}

/// Boundary to the concrete tool implementations. Each operation does its
/// own bounded retries and only returns `Err` once those are spent.
pub trait ToolSet {
    fn search_repositories(&self, query: &str, limit: u32) -> Result<Vec<Repository>, ToolError>;
    fn get_weather(&self, city: &str) -> Result<WeatherLookup, ToolError>;
}

/// Production tool set backed by the GitHub and Open-Meteo HTTP APIs.
pub struct HttpToolSet {
    github: GithubClient,
    weather: WeatherClient,
}

impl HttpToolSet {
    pub fn new(github: GithubClient, weather: WeatherClient) -> Self {
        Self { github, weather }
    }

    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        Ok(Self::new(
            GithubClient::from_config(config)?,
            WeatherClient::from_config(config)?,
        ))
    }
}

impl ToolSet for HttpToolSet {
    fn search_repositories(&self, query: &str, limit: u32) -> Result<Vec<Repository>, ToolError> {
        self.github.search_repositories(query, limit)
    }

    fn get_weather(&self, city: &str) -> Result<WeatherLookup, ToolError> {
        self.weather.get_weather(city)
    }
}

pub(crate) fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ToolError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ToolError::Status {
            status,
            url: resp.url().to_string(),
        })
    }
}
