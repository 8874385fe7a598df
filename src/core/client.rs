//! HTTP client for the Montara webhook and status endpoints.
//!
//! One POST triggers a run, one GET per poll reads its status. Neither
//! call is retried here; the only retrying in the system is the
//! orchestrator's poll loop, which retries on non-terminal status.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::domain::{RunHandle, RunStatusReport};
use crate::error::RunError;

/// Body of the trigger POST.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    pub branch: String,
    pub commit: String,
    /// Always `"CI"` for runs triggered from this client.
    pub run_environment: String,
    pub fallback_schema: String,
    pub is_smart_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_refresh: Option<bool>,
    pub allow_concurrent_pipeline_runs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbt_variables: Option<BTreeMap<String, String>>,
}

/// Seam between the orchestrator and the remote pipeline, so tests can
/// drive the loop with a scripted status sequence.
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Start a run and return its correlation identifiers.
    async fn trigger(&self, request: &TriggerRequest) -> Result<RunHandle, RunError>;

    /// Read the current status of a run.
    async fn poll_status(&self, handle: &RunHandle) -> Result<RunStatusReport, RunError>;
}

/// Client for the hosted Montara endpoints.
pub struct MontaraClient {
    http: reqwest::Client,
    webhook_url: String,
    hooks_base: String,
}

impl MontaraClient {
    pub fn new(webhook_url: String, is_staging: bool) -> Self {
        let host = if is_staging {
            "https://staging-hooks.montara.io"
        } else {
            "https://hooks.montara.io"
        };
        Self::with_hooks_base(webhook_url, host.to_string())
    }

    /// Point the status endpoint somewhere else (tests).
    pub fn with_hooks_base(webhook_url: String, hooks_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
            hooks_base: hooks_base.trim_end_matches('/').to_string(),
        }
    }

    fn status_url(&self) -> String {
        format!("{}/pipeline/run/status", self.hooks_base)
    }

    async fn trigger_inner(&self, request: &TriggerRequest) -> Result<RunHandle> {
        debug!(webhook_url = %self.webhook_url, branch = %request.branch, "Triggering pipeline run");

        let response = self
            .http
            .post(&self.webhook_url)
            .json(request)
            .send()
            .await
            .context("Failed to reach the trigger webhook")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Trigger webhook returned {}: {}", status, body);
        }

        let handle: RunHandle = response
            .json()
            .await
            .context("Failed to parse trigger response")?;
        debug!(run_id = %handle.run_id, webhook_id = %handle.webhook_id, "Pipeline run triggered");
        Ok(handle)
    }

    async fn poll_inner(&self, handle: &RunHandle) -> Result<RunStatusReport> {
        let response = self
            .http
            .get(self.status_url())
            .query(&[
                ("runId", handle.run_id.as_str()),
                ("webhookId", handle.webhook_id.as_str()),
            ])
            .send()
            .await
            .context("Failed to reach the status endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Status endpoint returned {}: {}", status, body);
        }

        let report: RunStatusReport = response
            .json()
            .await
            .context("Failed to parse status response")?;
        debug!(status = ?report.status, "Got response from status check");
        Ok(report)
    }
}

#[async_trait]
impl PipelineService for MontaraClient {
    async fn trigger(&self, request: &TriggerRequest) -> Result<RunHandle, RunError> {
        self.trigger_inner(request).await.map_err(RunError::Trigger)
    }

    async fn poll_status(&self, handle: &RunHandle) -> Result<RunStatusReport, RunError> {
        self.poll_inner(handle).await.map_err(RunError::StatusCheck)
    }
}
