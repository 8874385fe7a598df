//! montara-ci - CI client for Montara pipeline runs
//!
//! Triggers a remote Montara pipeline run from a pull request, polls its
//! status under a bounded retry budget, and reports progress and results
//! back to the pull request as comments.
//!
//! # Architecture
//!
//! One invocation drives one run, strictly sequentially:
//! - The orchestrator triggers the run through the webhook
//! - A bounded poll loop classifies each status report
//! - Lifecycle transitions render comments that a publisher delivers
//! - A telemetry sink records job start/success/failure, best-effort
//!
//! # Modules
//!
//! - `adapters`: External system integrations (GitHub comments, Segment)
//! - `core`: Orchestration logic (pipeline client, poll loop)
//! - `domain`: Data structures (status wire types, run session)
//! - `render`: Comment templates, placeholder renderer, formatting
//! - `cli`: Command-line interface / action entrypoint
//!
//! # Usage
//!
//! ```bash
//! INPUT_WEBHOOKURL=https://hooks.montara.io/webhook/... montara-ci
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod render;

// Re-export main types at crate root for convenience
pub use adapters::{CiEvent, CommentPublisher, EventSink, GithubPublisher, PullRequestContext};
pub use config::RunConfig;
pub use core::{MontaraClient, Orchestrator, PipelineService, PollPolicy, TriggerRequest};
pub use domain::{CancelledReason, RunOutcome, RunSession, RunStatus, RunStatusReport};
pub use error::RunError;
