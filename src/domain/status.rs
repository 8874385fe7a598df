//! Wire types for the Montara webhook and status endpoints.
//!
//! The status contract has drifted over time, so every enum here is
//! unknown-tolerant: values we don't recognize deserialize to an explicit
//! `Unknown` variant instead of failing the whole poll.

use serde::{Deserialize, Serialize};

/// Correlation identifiers returned by the trigger call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHandle {
    pub run_id: String,
    pub webhook_id: String,
}

/// Lifecycle status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelling,
    Cancelled,
    /// Another run is already active for this webhook.
    Conflict,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// A terminal status ends the poll loop. `Conflict` is handled earlier
    /// as an immediate abort and is not considered terminal here.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Why a run ended up `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelledReason {
    UserCancelled,
    Conflict,
    NoModelsToRun,
    MissingTargetInfo,
    #[serde(other)]
    Unknown,
}

/// Outcome of one model within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Success,
    Error,
    Skipped,
    #[serde(other)]
    Unknown,
}

/// Per-model execution detail reported by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRunDetail {
    pub name: String,
    pub status: ModelStatus,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    #[serde(default)]
    pub run_environment: Option<String>,
    #[serde(default)]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub rows_affected: Option<u64>,
}

/// One general (non-model) error reported by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Error detail attached to a status response. Per-model errors are kept
/// opaque; only the ordered general errors are rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineErrors {
    #[serde(default)]
    pub general_errors: Vec<GeneralError>,
    #[serde(default)]
    pub model_errors: Option<serde_json::Value>,
}

impl PipelineErrors {
    /// Message of the first general error, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.general_errors.first().map(|e| e.message.as_str())
    }
}

/// Aggregate model counts derived from `modelRunDetails`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelCounts {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl ModelCounts {
    pub fn from_details(details: &[ModelRunDetail]) -> Self {
        let mut counts = Self {
            total: details.len() as u64,
            ..Self::default()
        };
        for detail in details {
            match detail.status {
                ModelStatus::Success => counts.passed += 1,
                ModelStatus::Error => counts.failed += 1,
                ModelStatus::Skipped => counts.skipped += 1,
                ModelStatus::Unknown => {}
            }
        }
        counts
    }
}

/// Parsed result of one status poll.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusReport {
    #[serde(default)]
    pub id: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub cancelled_reason: Option<CancelledReason>,
    #[serde(default)]
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub errors: Option<PipelineErrors>,
    #[serde(default)]
    pub model_run_details: Vec<ModelRunDetail>,
}

impl RunStatusReport {
    /// Derive aggregate counts from the per-model detail.
    pub fn model_counts(&self) -> ModelCounts {
        ModelCounts::from_details(&self.model_run_details)
    }

    pub fn first_error_message(&self) -> Option<&str> {
        self.errors.as_ref().and_then(|e| e.first_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        let report: RunStatusReport = serde_json::from_str(
            r#"{
                "id": "abc",
                "status": "in_progress",
                "pipelineId": "p-1",
                "modelRunDetails": []
            }"#,
        )
        .unwrap();
        assert_eq!(report.status, RunStatus::InProgress);
        assert_eq!(report.pipeline_id.as_deref(), Some("p-1"));
        assert!(report.cancelled_reason.is_none());
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let report: RunStatusReport =
            serde_json::from_str(r#"{"status": "definitely_new_status"}"#).unwrap();
        assert_eq!(report.status, RunStatus::Unknown);
        assert!(!report.status.is_terminal());
    }

    #[test]
    fn test_cancelled_reason_parsing() {
        let report: RunStatusReport = serde_json::from_str(
            r#"{"status": "cancelled", "cancelledReason": "noModelsToRun"}"#,
        )
        .unwrap();
        assert_eq!(report.cancelled_reason, Some(CancelledReason::NoModelsToRun));

        let report: RunStatusReport = serde_json::from_str(
            r#"{"status": "cancelled", "cancelledReason": "somethingElse"}"#,
        )
        .unwrap();
        assert_eq!(report.cancelled_reason, Some(CancelledReason::Unknown));
    }

    #[test]
    fn test_model_counts() {
        let report: RunStatusReport = serde_json::from_str(
            r#"{
                "status": "completed",
                "modelRunDetails": [
                    {"name": "a", "status": "success"},
                    {"name": "b", "status": "success"},
                    {"name": "c", "status": "error"},
                    {"name": "d", "status": "skipped"}
                ]
            }"#,
        )
        .unwrap();
        let counts = report.model_counts();
        assert_eq!(counts.total, 4);
        assert_eq!(counts.passed, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped, 1);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::Cancelling.is_terminal());
        assert!(!RunStatus::Conflict.is_terminal());
    }

    #[test]
    fn test_first_error_message() {
        let report: RunStatusReport = serde_json::from_str(
            r#"{
                "status": "cancelled",
                "errors": {
                    "generalErrors": [
                        {"type": "compilation", "message": "bad ref"},
                        {"type": "other", "message": "second"}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(report.first_error_message(), Some("bad ref"));
    }
}
