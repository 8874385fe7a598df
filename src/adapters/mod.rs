//! Adapter interfaces for external systems.
//!
//! Adapters wrap the two outbound side channels the orchestrator needs:
//! posting pull-request comments and emitting lifecycle telemetry. Both
//! sit behind traits so tests can capture calls in memory.

pub mod github;
pub mod segment;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

pub use github::{GithubPublisher, PullRequestContext};
pub use segment::{NoopSink, SegmentSink};

/// Posts a comment to the pull request that started this CI job.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    async fn post_comment(&self, body: &str) -> Result<()>;
}

/// Lifecycle events emitted once per CI job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiEvent {
    JobStarted,
    JobSuccess,
    JobFailed,
    JobRuntimeError,
}

impl CiEvent {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            Self::JobStarted => "montara_ciJobStarted",
            Self::JobSuccess => "montara_ciJobSuccess",
            Self::JobFailed => "montara_ciJobFailed",
            Self::JobRuntimeError => "montara_ciJobRuntimeError",
        }
    }
}

/// Telemetry sink. Delivery is best-effort: implementations log failures
/// and never surface them to the run.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn track(&self, event: CiEvent, properties: HashMap<String, String>);
}
