//! Core orchestration logic.
//!
//! This module contains:
//! - Client: the trigger and status-poll HTTP calls
//! - Orchestrator: the poll loop and outcome classification

pub mod client;
pub mod orchestrator;

pub use client::{MontaraClient, PipelineService, TriggerRequest};
pub use orchestrator::{CancelledPolicy, Orchestrator, PollErrorPolicy, PollPolicy};
