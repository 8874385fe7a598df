//! Run orchestrator: the poll loop and outcome classification.
//!
//! After a successful trigger the orchestrator polls the status endpoint
//! under a bounded retry budget, posts the Pending/Started comments at
//! most once each, and posts the Result comment at the first terminal
//! status before classifying the run as success or failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::adapters::{CiEvent, CommentPublisher, EventSink};
use crate::domain::{RunOutcome, RunSession, RunStatus, RunStatusReport};
use crate::error::RunError;
use crate::render::{
    build_pending_comment, build_result_comment, build_started_comment, format_duration,
    DurationFormat, ResultComment, RunLink,
};

use super::client::{PipelineService, TriggerRequest};

/// What to do when a status poll itself fails.
///
/// The canonical contract treats a failed poll as fatal; `Retry` keeps the
/// older behavior of burning an attempt and carrying on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollErrorPolicy {
    Fatal,
    Retry,
}

/// How to classify a terminal `cancelled` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledPolicy {
    /// Branch on the cancellation reason; only "nothing to run" (and
    /// reasons we don't recognize) count as success.
    ByReason,
    /// Every cancellation fails the job.
    AlwaysFailure,
}

/// Retry budget and pacing for the poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of status checks before giving up.
    pub num_retries: u32,
    /// Delay between trigger and first poll, covering the remote system's
    /// eventual-consistency lag.
    pub warmup: Duration,
    /// Delay between polls.
    pub interval: Duration,
    pub poll_error: PollErrorPolicy,
    pub cancelled: CancelledPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            num_retries: 60,
            warmup: Duration::from_millis(2000),
            interval: Duration::from_millis(10000),
            poll_error: PollErrorPolicy::Fatal,
            cancelled: CancelledPolicy::ByReason,
        }
    }
}

impl PollPolicy {
    pub fn with_num_retries(mut self, num_retries: u32) -> Self {
        self.num_retries = num_retries;
        self
    }
}

/// Drives one pipeline run from trigger to terminal outcome.
pub struct Orchestrator {
    pipeline: Box<dyn PipelineService>,
    publisher: Box<dyn CommentPublisher>,
    sink: Arc<dyn EventSink>,
    policy: PollPolicy,
    is_staging: bool,
}

impl Orchestrator {
    pub fn new(
        pipeline: Box<dyn PipelineService>,
        publisher: Box<dyn CommentPublisher>,
        sink: Arc<dyn EventSink>,
        policy: PollPolicy,
        is_staging: bool,
    ) -> Self {
        Self {
            pipeline,
            publisher,
            sink,
            policy,
            is_staging,
        }
    }

    /// Trigger the run and poll it to completion.
    #[instrument(skip(self, request), fields(branch = %request.branch))]
    pub async fn run(&self, request: &TriggerRequest) -> Result<RunOutcome, RunError> {
        let started_at = Instant::now();
        let handle = self.pipeline.trigger(request).await?;
        info!(run_id = %handle.run_id, "Pipeline run triggered");

        let mut session = RunSession::new(handle, started_at);

        tokio::time::sleep(self.policy.warmup).await;

        while session.attempt < self.policy.num_retries {
            info!(
                run_id = %session.handle.run_id,
                attempt = session.attempt,
                max = self.policy.num_retries,
                "Checking status of pipeline run"
            );

            match self.pipeline.poll_status(&session.handle).await {
                Ok(report) => {
                    if report.status == RunStatus::Conflict {
                        return Err(RunError::Conflict);
                    }

                    if report.status == RunStatus::InProgress
                        && session.claim_started_comment()
                    {
                        info!("Pipeline run started");
                        self.publisher
                            .post_comment(&build_started_comment(&self.run_link(
                                &session, &report,
                            )))
                            .await?;
                    }

                    if report.status == RunStatus::Pending && session.claim_pending_comment() {
                        info!("Pipeline run is pending");
                        self.publisher.post_comment(&build_pending_comment()).await?;
                    }

                    if report.status.is_terminal() {
                        info!(status = ?report.status, "Pipeline run reached a terminal status");
                        self.post_result_comment(&session, &report).await?;
                        return self.classify(&session, &report).await;
                    }
                }
                Err(e) => match self.policy.poll_error {
                    PollErrorPolicy::Fatal => return Err(e),
                    PollErrorPolicy::Retry => {
                        warn!(error = %e, "Status check failed, retrying");
                    }
                },
            }

            session.attempt += 1;
            if session.attempt < self.policy.num_retries {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        self.track(CiEvent::JobFailed, &session).await;
        Err(RunError::RetriesExhausted {
            attempts: self.policy.num_retries,
        })
    }

    fn run_link(&self, session: &RunSession, report: &RunStatusReport) -> RunLink {
        RunLink {
            is_staging: self.is_staging,
            run_id: session.handle.run_id.clone(),
            pipeline_id: report.pipeline_id.clone().unwrap_or_default(),
        }
    }

    async fn post_result_comment(
        &self,
        session: &RunSession,
        report: &RunStatusReport,
    ) -> Result<(), RunError> {
        let error_message = if report.status == RunStatus::Cancelled {
            report.first_error_message().map(str::to_string)
        } else {
            None
        };

        let comment = build_result_comment(&ResultComment {
            link: self.run_link(session, report),
            status: report.status,
            counts: report.model_counts(),
            run_duration: format_duration(session.elapsed_seconds(), DurationFormat::default()),
            error_message,
        });
        self.publisher.post_comment(&comment).await?;
        Ok(())
    }

    /// Decide the final outcome of a terminal status.
    async fn classify(
        &self,
        session: &RunSession,
        report: &RunStatusReport,
    ) -> Result<RunOutcome, RunError> {
        match report.status {
            RunStatus::Completed => {
                self.track(CiEvent::JobSuccess, session).await;
                Ok(RunOutcome::Completed)
            }
            RunStatus::Failed => {
                self.track(CiEvent::JobFailed, session).await;
                Err(RunError::PipelineFailed)
            }
            RunStatus::Cancelled => {
                let reason = report
                    .cancelled_reason
                    .unwrap_or(crate::domain::CancelledReason::Unknown);
                let failure = match self.policy.cancelled {
                    CancelledPolicy::ByReason => RunError::from_cancelled_reason(reason),
                    CancelledPolicy::AlwaysFailure => Some(
                        RunError::from_cancelled_reason(reason)
                            .unwrap_or(RunError::PipelineFailed),
                    ),
                };
                match failure {
                    Some(err) => {
                        self.track(CiEvent::JobFailed, session).await;
                        Err(err)
                    }
                    None => {
                        info!(?reason, "Pipeline run cancelled benignly");
                        self.track(CiEvent::JobSuccess, session).await;
                        Ok(RunOutcome::SkippedNoModels)
                    }
                }
            }
            // classify is only called on terminal statuses
            _ => Err(RunError::Runtime(anyhow::anyhow!(
                "non-terminal status {:?} reached classification",
                report.status
            ))),
        }
    }

    async fn track(&self, event: CiEvent, session: &RunSession) {
        self.sink
            .track(
                event,
                HashMap::from([("runId".to_string(), session.handle.run_id.clone())]),
            )
            .await;
    }
}
