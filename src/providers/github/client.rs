use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::context::LabelSet;
use crate::error::{BenchGateError, Result};

use super::types::{GitHubLabel, RepoPath};

/// GitHub REST API client, limited to the calls the gates need.
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `token` - Optional GitHub token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or `base_url` is not a URL.
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("benchgate/0.1"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BenchGateError::Config(format!("Failed to create HTTP client: {e}")))?;

        // A trailing slash keeps `join` from dropping the last path segment
        // of enterprise URLs such as https://ghe.example.com/api/v3
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let api_url = Url::parse(&normalized)
            .map_err(|e| BenchGateError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Fetch the labels currently attached to a pull request.
    ///
    /// Pull requests share their number with the underlying issue, so this
    /// reads the issue labels endpoint.
    pub async fn fetch_pull_request_labels(&self, repo: &RepoPath, number: u64) -> Result<LabelSet> {
        let url = self
            .api_url
            .join(&format!(
                "repos/{}/{}/issues/{number}/labels?per_page=100",
                repo.owner, repo.repo
            ))
            .map_err(|e| BenchGateError::Config(format!("Invalid labels URL: {e}")))?;

        debug!("Fetching labels from {url}");

        let response = self.auth_request(self.client.get(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BenchGateError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let labels: Vec<GitHubLabel> = response.json().await?;
        Ok(labels.into_iter().map(|label| label.name).collect())
    }
}
