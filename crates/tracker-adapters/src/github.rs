//! GitHub REST client backing the `RepositoryGateway` port.
//!
//! Two endpoints only: repository lookup and issue creation. Authentication
//! is a bearer token; the API root is overridable for GitHub Enterprise
//! deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{GatewayError, IssueRecord, RepositoryGateway, RepositoryHandle};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::locator::parse_locator;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

pub struct GithubGateway {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
}

impl GithubGateway {
    pub fn new(token: SecretString) -> Result<Self, GatewayError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Points the client at a non-default API root.
    pub fn with_api_base(token: SecretString, api_base: &str) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("threadbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| GatewayError::Remote(err.to_string()))?;
        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

fn remote(err: reqwest::Error) -> GatewayError {
    GatewayError::Remote(err.without_url().to_string())
}

// GitHub API response types (the subset consumed here)

#[derive(Debug, Deserialize)]
struct GhRepository {
    full_name: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    id: i64,
    html_url: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl RepositoryGateway for GithubGateway {
    async fn resolve(&self, locator: &str) -> Result<RepositoryHandle, GatewayError> {
        let full_name = parse_locator(locator)?;
        let url = format!("{}/repos/{}", self.api_base, full_name);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(remote)?;

        match response.status() {
            // Missing and forbidden repositories are indistinguishable to
            // the caller and neither is retried.
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
                return Err(GatewayError::NotFoundOrForbidden(full_name));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::Remote(format!(
                    "GET /repos/{} returned {}: {}",
                    full_name, status, body
                )));
            }
            _ => {}
        }

        let repo: GhRepository = response.json().await.map_err(remote)?;
        Ok(RepositoryHandle {
            full_name: repo.full_name,
            url: repo.html_url,
        })
    }

    async fn create_issue(
        &self,
        handle: &RepositoryHandle,
        title: &str,
        body: &str,
    ) -> Result<IssueRecord, GatewayError> {
        let url = format!("{}/repos/{}/issues", self.api_base, handle.full_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .await
            .map_err(remote)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Remote(format!(
                "POST /repos/{}/issues returned {}: {}",
                handle.full_name, status, body
            )));
        }

        let issue: GhIssue = response.json().await.map_err(remote)?;
        Ok(IssueRecord {
            id: issue.id,
            url: issue.html_url,
            created_at: issue.created_at,
        })
    }
}
