//! Data structures shared across the client.
//!
//! This module contains:
//! - Status: wire types for the trigger and status endpoints
//! - Session: per-invocation run state owned by the orchestrator

pub mod session;
pub mod status;

pub use session::{RunOutcome, RunSession};
pub use status::{
    CancelledReason, GeneralError, ModelCounts, ModelRunDetail, ModelStatus, PipelineErrors,
    RunHandle, RunStatus, RunStatusReport,
};
