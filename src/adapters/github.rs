//! GitHub adapter: pull-request context resolution and comment posting.
//!
//! The hosting workflow provides everything we need through the standard
//! Actions environment: the event payload file carries the pull request
//! and repository, and the token comes from `MONTARA_GITHUB_TOKEN` (or
//! `GITHUB_TOKEN` as a fallback).

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::RunError;

use super::CommentPublisher;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Where the run's comments go, plus the branch/commit under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub branch: String,
    pub commit: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
    repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: HeadPayload,
}

#[derive(Debug, Deserialize)]
struct HeadPayload {
    #[serde(rename = "ref")]
    branch: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

impl PullRequestContext {
    /// Resolve the context from `GITHUB_EVENT_PATH`. Anything missing is a
    /// configuration failure, raised before any network call.
    pub fn from_env() -> Result<Self, RunError> {
        let event_path = std::env::var("GITHUB_EVENT_PATH").map_err(|_| {
            RunError::Configuration("GITHUB_EVENT_PATH is not set; not running in a workflow?".to_string())
        })?;
        Self::from_event_file(Path::new(&event_path))
    }

    /// Parse a workflow event payload file.
    pub fn from_event_file(path: &Path) -> Result<Self, RunError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RunError::Configuration(format!("Failed to read event payload {}: {}", path.display(), e))
        })?;
        let payload: EventPayload = serde_json::from_str(&raw).map_err(|e| {
            RunError::Configuration(format!("Failed to parse event payload: {}", e))
        })?;

        let pull_request = payload.pull_request.ok_or_else(|| {
            RunError::Configuration("No pull request found in the workflow context".to_string())
        })?;
        let repository = payload.repository.ok_or_else(|| {
            RunError::Configuration("No repository found in the workflow context".to_string())
        })?;

        Ok(Self {
            owner: repository.owner.login,
            repo: repository.name,
            pr_number: pull_request.number,
            branch: pull_request.head.branch,
            commit: pull_request.head.sha,
        })
    }
}

/// Posts comments through the GitHub REST API.
pub struct GithubPublisher {
    http: reqwest::Client,
    api_base: String,
    context: PullRequestContext,
}

impl GithubPublisher {
    pub fn new(token: &str, context: PullRequestContext) -> Result<Self> {
        Self::with_api_base(token, context, GITHUB_API_BASE.to_string())
    }

    /// Build a publisher from the workflow environment.
    pub fn from_env(context: PullRequestContext) -> Result<Self, RunError> {
        let token = std::env::var("MONTARA_GITHUB_TOKEN")
            .or_else(|_| std::env::var("GITHUB_TOKEN"))
            .map_err(|_| {
                RunError::Configuration(
                    "Neither MONTARA_GITHUB_TOKEN nor GITHUB_TOKEN is set".to_string(),
                )
            })?;
        Self::new(&token, context).map_err(RunError::Runtime)
    }

    /// Point the publisher at a different API host (tests).
    pub fn with_api_base(
        token: &str,
        context: PullRequestContext,
        api_base: String,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("montara-ci"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("Invalid GitHub authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build GitHub client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            context,
        })
    }

    fn comments_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, self.context.owner, self.context.repo, self.context.pr_number
        )
    }
}

#[async_trait]
impl CommentPublisher for GithubPublisher {
    async fn post_comment(&self, body: &str) -> Result<()> {
        let response = self
            .http
            .post(self.comments_url())
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .context("Failed to reach the GitHub API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub comment API returned {}: {}", status, detail);
        }

        debug!(pr = self.context.pr_number, "Comment posted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context() -> PullRequestContext {
        PullRequestContext {
            owner: "montara-io".to_string(),
            repo: "analytics".to_string(),
            pr_number: 17,
            branch: "feature/models".to_string(),
            commit: "deadbeef".to_string(),
        }
    }

    #[test]
    fn test_event_file_parsing() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "pull_request": {{
                    "number": 17,
                    "head": {{"ref": "feature/models", "sha": "deadbeef"}}
                }},
                "repository": {{
                    "name": "analytics",
                    "owner": {{"login": "montara-io"}}
                }}
            }}"#
        )
        .unwrap();

        let parsed = PullRequestContext::from_event_file(file.path()).unwrap();
        assert_eq!(parsed, context());
    }

    #[test]
    fn test_event_file_without_pull_request() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"repository": {{"name": "r", "owner": {{"login": "o"}}}}}}"#).unwrap();

        let err = PullRequestContext::from_event_file(file.path()).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
        assert!(err.to_string().contains("No pull request"));
    }

    #[test]
    fn test_comments_url() {
        let publisher = GithubPublisher::new("token", context()).unwrap();
        assert_eq!(
            publisher.comments_url(),
            "https://api.github.com/repos/montara-io/analytics/issues/17/comments"
        );
    }

    #[tokio::test]
    async fn test_post_comment() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/repos/montara-io/analytics/issues/17/comments")
                    .json_body(serde_json::json!({"body": "hello"}));
                then.status(201).json_body(serde_json::json!({"id": 1}));
            })
            .await;

        let publisher =
            GithubPublisher::with_api_base("token", context(), server.base_url()).unwrap();
        publisher.post_comment("hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_comment_failure_is_an_error() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST);
                then.status(403).body("forbidden");
            })
            .await;

        let publisher =
            GithubPublisher::with_api_base("token", context(), server.base_url()).unwrap();
        let err = publisher.post_comment("hello").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
