//! Error taxonomy for a CI run.
//!
//! Every fatal path in the client maps to one of these variants so the
//! top-level boundary can print a single failure line and pick an exit
//! code. Nothing below the CLI calls `process::exit`.

use thiserror::Error;

use crate::domain::CancelledReason;

/// Errors that can end a CI run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bad or missing configuration, detected before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The trigger POST failed. Never retried.
    #[error("failed to trigger pipeline run: {0}")]
    Trigger(#[source] anyhow::Error),

    /// A status poll failed. Fatal under the canonical policy.
    #[error("failed to check pipeline run status: {0}")]
    StatusCheck(#[source] anyhow::Error),

    /// Another run is already active for this webhook.
    #[error("there is an existing pipeline run in progress; wait for it to complete before triggering a new run")]
    Conflict,

    /// The run was cancelled by a user.
    #[error("pipeline run was cancelled by a user")]
    UserCancelled,

    /// The run was cancelled because target connection info is missing.
    #[error("pipeline run was cancelled: missing target connection info")]
    MissingTargetInfo,

    /// The run reached a terminal `failed` status.
    #[error("pipeline run failed")]
    PipelineFailed,

    /// The poll loop used up its retry budget without a terminal status.
    #[error("pipeline run did not finish within {attempts} status checks")]
    RetriesExhausted { attempts: u32 },

    /// Anything else that escaped the run.
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

impl RunError {
    /// Map a cancellation reason to its failure variant, or `None` when the
    /// cancellation is benign (nothing to run, or a reason we don't know).
    pub fn from_cancelled_reason(reason: CancelledReason) -> Option<Self> {
        match reason {
            CancelledReason::Conflict => Some(Self::Conflict),
            CancelledReason::UserCancelled => Some(Self::UserCancelled),
            CancelledReason::MissingTargetInfo => Some(Self::MissingTargetInfo),
            CancelledReason::NoModelsToRun | CancelledReason::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_cancel_reasons() {
        assert!(RunError::from_cancelled_reason(CancelledReason::NoModelsToRun).is_none());
        assert!(RunError::from_cancelled_reason(CancelledReason::Unknown).is_none());
        assert!(matches!(
            RunError::from_cancelled_reason(CancelledReason::Conflict),
            Some(RunError::Conflict)
        ));
        assert!(matches!(
            RunError::from_cancelled_reason(CancelledReason::UserCancelled),
            Some(RunError::UserCancelled)
        ));
        assert!(matches!(
            RunError::from_cancelled_reason(CancelledReason::MissingTargetInfo),
            Some(RunError::MissingTargetInfo)
        ));
    }
}
