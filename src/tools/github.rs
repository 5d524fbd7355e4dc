// src/tools/github.rs

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::tools::{Repository, RetryPolicy, check_status};

const AGENT: &str = concat!("agentic-orchestrator/", env!("CARGO_PKG_VERSION"));

/// Repository search via `GET /search/repositories`, most-starred first.
pub struct GithubClient {
    client: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    full_name: Option<String>,
    stargazers_count: Option<u64>,
    html_url: Option<String>,
}

impl GithubClient {
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            retry: RetryPolicy::new(config.retries, Duration::from_millis(config.backoff_ms)),
        })
    }

    pub fn search_repositories(&self, query: &str, limit: u32) -> Result<Vec<Repository>, ToolError> {
        self.retry
            .run("github_search", || self.search_once(query, limit))
    }

    fn search_once(&self, query: &str, limit: u32) -> Result<Vec<Repository>, ToolError> {
        debug!(query, limit, "searching repositories");

        let per_page = limit.to_string();
        let mut request = self
            .client
            .get(format!("{}/search/repositories", self.api_base))
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, AGENT);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let body: SearchResponse = check_status(request.send()?)?.json()?;

        Ok(body
            .items
            .into_iter()
            .map(|item| Repository {
                name: item.full_name,
                stars: item.stargazers_count,
                url: item.html_url,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server, token: Option<&str>) -> GithubClient {
        GithubClient::from_config(&ToolsConfig {
            github_api_base: server.url(),
            github_token: token.map(str::to_string),
            retries: 2,
            backoff_ms: 0,
            ..ToolsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn maps_search_items() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "rust".into()),
                Matcher::UrlEncoded("sort".into(), "stars".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
            ]))
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_body(
                r#"{"items": [
                    {"full_name": "rust-lang/rust", "stargazers_count": 90000, "html_url": "https://github.com/rust-lang/rust"},
                    {"full_name": "denoland/deno", "stargazers_count": 80000, "html_url": "https://github.com/denoland/deno"}
                ]}"#,
            )
            .create();

        let repos = client_for(&server, Some("secret"))
            .search_repositories("rust", 2)
            .unwrap();

        mock.assert();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name.as_deref(), Some("rust-lang/rust"));
        assert_eq!(repos[1].stars, Some(80000));
    }

    #[test]
    fn server_errors_are_retried_then_surfaced() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(2)
            .create();

        let err = client_for(&server, None)
            .search_repositories("rust", 3)
            .unwrap_err();

        mock.assert();
        assert!(matches!(err, ToolError::Exhausted { attempts: 2, .. }));
    }
}
