//! Per-invocation run state.
//!
//! A `RunSession` is created right after a successful trigger and mutated
//! on each poll iteration. The two posted-flags flip false→true at most
//! once each, so the Pending and Started comments cannot be duplicated no
//! matter how many polls report the same status.

use std::time::Instant;

use super::status::RunHandle;

/// Mutable state for one pipeline run, owned by the orchestrator.
#[derive(Debug, Clone)]
pub struct RunSession {
    /// Correlation identifiers from the trigger call.
    pub handle: RunHandle,

    /// Captured before the trigger call, so the reported duration covers
    /// the whole run as the user experienced it.
    pub started_at: Instant,

    /// Poll attempts performed so far.
    pub attempt: u32,

    started_comment_posted: bool,
    pending_comment_posted: bool,
}

impl RunSession {
    pub fn new(handle: RunHandle, started_at: Instant) -> Self {
        Self {
            handle,
            started_at,
            attempt: 0,
            started_comment_posted: false,
            pending_comment_posted: false,
        }
    }

    /// True exactly once: the first call claims the Started comment slot.
    pub fn claim_started_comment(&mut self) -> bool {
        !std::mem::replace(&mut self.started_comment_posted, true)
    }

    /// True exactly once: the first call claims the Pending comment slot.
    pub fn claim_pending_comment(&mut self) -> bool {
        !std::mem::replace(&mut self.pending_comment_posted, true)
    }

    /// Seconds elapsed since the trigger was issued.
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Success-class outcomes of a run. Failure shapes live in `RunError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run reached `completed`.
    Completed,

    /// The run was cancelled for a benign reason (nothing to run, or an
    /// unrecognized reason treated conservatively as benign).
    SkippedNoModels,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> RunHandle {
        RunHandle {
            run_id: "r-1".to_string(),
            webhook_id: "w-1".to_string(),
        }
    }

    #[test]
    fn test_comment_claims_are_one_shot() {
        let mut session = RunSession::new(handle(), Instant::now());

        assert!(session.claim_pending_comment());
        assert!(!session.claim_pending_comment());
        assert!(!session.claim_pending_comment());

        assert!(session.claim_started_comment());
        assert!(!session.claim_started_comment());
    }

    #[test]
    fn test_claims_are_independent() {
        let mut session = RunSession::new(handle(), Instant::now());
        assert!(session.claim_started_comment());
        // Claiming Started must not consume the Pending slot.
        assert!(session.claim_pending_comment());
    }
}
